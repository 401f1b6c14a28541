use super::models::Listing;
use super::position_repository::column_address;
use crate::error::Result;
use rusqlite::{Connection, Row, params};

/// Read access to the listing table maintained by the listing service.
pub struct ListingRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ListingRepository<'a> {
    const SELECT_LISTINGS: &'static str =
        "SELECT token_address, is_public, owner_address FROM listing ORDER BY token_address";

    const INSERT_LISTING: &'static str = "INSERT OR REPLACE INTO listing
         (token_address, is_public, owner_address) VALUES (?1, ?2, ?3)";

    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn list(&self) -> Result<Vec<Listing>> {
        let mut stmt = self.conn.prepare(Self::SELECT_LISTINGS)?;
        let listings = stmt
            .query_map([], Self::row_to_listing)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    pub fn insert(&self, listing: &Listing) -> Result<()> {
        self.conn.execute(
            Self::INSERT_LISTING,
            params![
                format!("{:?}", listing.token_address),
                listing.is_public,
                format!("{:?}", listing.owner_address)
            ],
        )?;
        Ok(())
    }

    fn row_to_listing(row: &Row) -> rusqlite::Result<Listing> {
        Ok(Listing {
            token_address: column_address(row, 0)?,
            is_public: row.get(1)?,
            owner_address: column_address(row, 2)?,
        })
    }
}

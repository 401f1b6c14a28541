//! Token categories and what each of them can emit.

use crate::events::EventKind;
use std::fmt;
use std::str::FromStr;

/// Token template, as registered in the token list contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StraightBond,
    Share,
    Membership,
    Coupon,
}

/// Which position fields a sync pass re-reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields {
    pub balance: bool,
    pub pending_transfer: bool,
    pub exchange: bool,
}

impl Fields {
    pub const BALANCE: Fields = Fields {
        balance: true,
        pending_transfer: false,
        exchange: false,
    };
    pub const BALANCE_AND_PENDING: Fields = Fields {
        balance: true,
        pending_transfer: true,
        exchange: false,
    };
    pub const EXCHANGE: Fields = Fields {
        balance: false,
        pending_transfer: false,
        exchange: true,
    };

    pub fn with_exchange(self) -> Fields {
        Fields {
            exchange: true,
            ..self
        }
    }
}

const SECURITY_TOKEN_EVENTS: &[EventKind] = &[
    EventKind::Transfer,
    EventKind::Lock,
    EventKind::Unlock,
    EventKind::Issue,
    EventKind::Redeem,
    EventKind::ApplyForTransfer,
    EventKind::CancelTransfer,
    EventKind::ApproveTransfer,
];

const COUPON_EVENTS: &[EventKind] = &[EventKind::Transfer, EventKind::Consume];

const MEMBERSHIP_EVENTS: &[EventKind] = &[EventKind::Transfer];

impl TokenKind {
    pub const ALL: [TokenKind; 4] = [
        TokenKind::StraightBond,
        TokenKind::Share,
        TokenKind::Membership,
        TokenKind::Coupon,
    ];

    /// Maps a template name returned by `getTokenByAddress`.
    pub fn from_template(template: &str) -> Option<Self> {
        match template {
            "IbetStraightBond" => Some(TokenKind::StraightBond),
            "IbetShare" => Some(TokenKind::Share),
            "IbetMembership" => Some(TokenKind::Membership),
            "IbetCoupon" => Some(TokenKind::Coupon),
            _ => None,
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            TokenKind::StraightBond => "IbetStraightBond",
            TokenKind::Share => "IbetShare",
            TokenKind::Membership => "IbetMembership",
            TokenKind::Coupon => "IbetCoupon",
        }
    }

    /// Token-emitted event kinds this template exposes.
    pub fn token_events(&self) -> &'static [EventKind] {
        match self {
            TokenKind::StraightBond | TokenKind::Share => SECURITY_TOKEN_EVENTS,
            TokenKind::Coupon => COUPON_EVENTS,
            TokenKind::Membership => MEMBERSHIP_EVENTS,
        }
    }

    pub fn supports(&self, kind: EventKind) -> bool {
        self.token_events().contains(&kind)
    }

    /// Security tokens carry a transfer-approval queue whose amount is mirrored
    /// in `pending_transfer`.
    pub fn tracks_pending_transfer(&self) -> bool {
        matches!(self, TokenKind::StraightBond | TokenKind::Share)
    }

    /// Fields refreshed for an account touched by a token-emitted event.
    pub fn token_fields(&self) -> Fields {
        if self.tracks_pending_transfer() {
            Fields::BALANCE_AND_PENDING
        } else {
            Fields::BALANCE
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = TokenKind::from_template(s) {
            return Ok(kind);
        }
        match s.to_lowercase().as_str() {
            "bond" | "straight_bond" => Ok(TokenKind::StraightBond),
            "share" => Ok(TokenKind::Share),
            "membership" => Ok(TokenKind::Membership),
            "coupon" => Ok(TokenKind::Coupon),
            other => Err(format!("unknown token category: {other}")),
        }
    }
}

use crate::contracts::{Dvp, Escrow, Exchange, SecurityToken};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use alloy_primitives::{Address, B256, U256};

/// Which kind of contract emits an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventClass {
    Token,
    Exchange,
    Escrow,
    Dvp,
}

impl EventClass {
    pub fn kinds(&self) -> &'static [EventKind] {
        match self {
            EventClass::Token => &[
                EventKind::Transfer,
                EventKind::Lock,
                EventKind::Unlock,
                EventKind::Issue,
                EventKind::Redeem,
                EventKind::ApplyForTransfer,
                EventKind::CancelTransfer,
                EventKind::ApproveTransfer,
                EventKind::Consume,
            ],
            EventClass::Exchange => &[
                EventKind::NewOrder,
                EventKind::CancelOrder,
                EventKind::ForceCancelOrder,
                EventKind::Agree,
                EventKind::SettlementOk,
                EventKind::SettlementNg,
            ],
            EventClass::Escrow => &[
                EventKind::EscrowCreated,
                EventKind::EscrowCanceled,
                EventKind::EscrowFinished,
                EventKind::HolderChanged,
            ],
            EventClass::Dvp => &[
                EventKind::DeliveryCreated,
                EventKind::DeliveryCanceled,
                EventKind::DeliveryAborted,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Transfer,
    Lock,
    Unlock,
    Issue,
    Redeem,
    ApplyForTransfer,
    CancelTransfer,
    ApproveTransfer,
    Consume,
    NewOrder,
    CancelOrder,
    ForceCancelOrder,
    Agree,
    SettlementOk,
    SettlementNg,
    EscrowCreated,
    EscrowCanceled,
    EscrowFinished,
    HolderChanged,
    DeliveryCreated,
    DeliveryCanceled,
    DeliveryAborted,
}

/// Role an address plays in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    From,
    To,
    Account,
    Lock,
    Recipient,
    Target,
    Consumer,
    Buyer,
    Seller,
    Sender,
}

impl EventKind {
    pub fn topic0(&self) -> B256 {
        match self {
            EventKind::Transfer => SecurityToken::Transfer::SIGNATURE_HASH,
            EventKind::Lock => SecurityToken::Lock::SIGNATURE_HASH,
            EventKind::Unlock => SecurityToken::Unlock::SIGNATURE_HASH,
            EventKind::Issue => SecurityToken::Issue::SIGNATURE_HASH,
            EventKind::Redeem => SecurityToken::Redeem::SIGNATURE_HASH,
            EventKind::ApplyForTransfer => SecurityToken::ApplyForTransfer::SIGNATURE_HASH,
            EventKind::CancelTransfer => SecurityToken::CancelTransfer::SIGNATURE_HASH,
            EventKind::ApproveTransfer => SecurityToken::ApproveTransfer::SIGNATURE_HASH,
            EventKind::Consume => SecurityToken::Consume::SIGNATURE_HASH,
            EventKind::NewOrder => Exchange::NewOrder::SIGNATURE_HASH,
            EventKind::CancelOrder => Exchange::CancelOrder::SIGNATURE_HASH,
            EventKind::ForceCancelOrder => Exchange::ForceCancelOrder::SIGNATURE_HASH,
            EventKind::Agree => Exchange::Agree::SIGNATURE_HASH,
            EventKind::SettlementOk => Exchange::SettlementOK::SIGNATURE_HASH,
            EventKind::SettlementNg => Exchange::SettlementNG::SIGNATURE_HASH,
            EventKind::EscrowCreated => Escrow::EscrowCreated::SIGNATURE_HASH,
            EventKind::EscrowCanceled => Escrow::EscrowCanceled::SIGNATURE_HASH,
            EventKind::EscrowFinished => Escrow::EscrowFinished::SIGNATURE_HASH,
            EventKind::HolderChanged => Escrow::HolderChanged::SIGNATURE_HASH,
            EventKind::DeliveryCreated => Dvp::DeliveryCreated::SIGNATURE_HASH,
            EventKind::DeliveryCanceled => Dvp::DeliveryCanceled::SIGNATURE_HASH,
            EventKind::DeliveryAborted => Dvp::DeliveryAborted::SIGNATURE_HASH,
        }
    }

    /// Roles whose position changes when this event fires.
    ///
    /// Order placement and agreement only move the seller's (or order owner's)
    /// exchange balance; settlement moves both sides.
    pub fn touched_roles(&self) -> &'static [Role] {
        use EventKind::*;
        match self {
            Transfer | ApproveTransfer | HolderChanged => &[Role::From, Role::To],
            Lock => &[Role::Account],
            Unlock => &[Role::Recipient],
            Issue | Redeem => &[Role::Target],
            ApplyForTransfer | CancelTransfer => &[Role::From],
            Consume => &[Role::Consumer],
            NewOrder | CancelOrder | ForceCancelOrder => &[Role::Account],
            Agree | SettlementNg => &[Role::Seller],
            SettlementOk => &[Role::Buyer, Role::Seller],
            EscrowCreated | EscrowCanceled => &[Role::Sender],
            EscrowFinished => &[Role::Sender, Role::Recipient],
            DeliveryCreated | DeliveryCanceled | DeliveryAborted => &[Role::Seller],
        }
    }

    /// Lock and Unlock also move the locked amount of `(lock, account)`.
    pub fn moves_locked_balance(&self) -> bool {
        matches!(self, EventKind::Lock | EventKind::Unlock)
    }
}

/// Amount and memo of a Lock or Unlock, kept for the lock history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockDetail {
    pub value: U256,
    pub data: String,
}

/// A decoded log reduced to what the indexer needs: which token it concerns
/// and which addresses it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: EventKind,
    pub block_number: u64,
    pub log_index: u64,
    pub transaction_hash: B256,
    pub token: Address,
    pub roles: Vec<(Role, Address)>,
    pub lock_detail: Option<LockDetail>,
}

impl DecodedEvent {
    pub fn account(&self, role: Role) -> Option<Address> {
        self.roles
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, address)| *address)
    }
}

fn decode<E: SolEvent>(log: &Log) -> alloy::sol_types::Result<E> {
    let log_data = log.data();
    E::decode_raw_log(log.topics(), &log_data.data)
}

/// Decodes `log` as `kind`. Token-emitted events concern the emitting
/// contract; exchange, escrow and DVP events name their token explicitly.
pub fn decode_event(kind: EventKind, log: &Log) -> alloy::sol_types::Result<DecodedEvent> {
    let emitter = log.address();
    let mut lock_detail = None;
    let (token, roles) = match kind {
        EventKind::Transfer => {
            let e = decode::<SecurityToken::Transfer>(log)?;
            (emitter, vec![(Role::From, e.from), (Role::To, e.to)])
        }
        EventKind::Lock => {
            let e = decode::<SecurityToken::Lock>(log)?;
            lock_detail = Some(LockDetail {
                value: e.value,
                data: e.data,
            });
            (
                emitter,
                vec![(Role::Account, e.accountAddress), (Role::Lock, e.lockAddress)],
            )
        }
        EventKind::Unlock => {
            let e = decode::<SecurityToken::Unlock>(log)?;
            lock_detail = Some(LockDetail {
                value: e.value,
                data: e.data,
            });
            (
                emitter,
                vec![
                    (Role::Account, e.accountAddress),
                    (Role::Lock, e.lockAddress),
                    (Role::Recipient, e.recipientAddress),
                ],
            )
        }
        EventKind::Issue => {
            let e = decode::<SecurityToken::Issue>(log)?;
            (emitter, vec![(Role::Target, e.targetAddress)])
        }
        EventKind::Redeem => {
            let e = decode::<SecurityToken::Redeem>(log)?;
            (emitter, vec![(Role::Target, e.targetAddress)])
        }
        EventKind::ApplyForTransfer => {
            let e = decode::<SecurityToken::ApplyForTransfer>(log)?;
            (emitter, vec![(Role::From, e.from), (Role::To, e.to)])
        }
        EventKind::CancelTransfer => {
            let e = decode::<SecurityToken::CancelTransfer>(log)?;
            (emitter, vec![(Role::From, e.from), (Role::To, e.to)])
        }
        EventKind::ApproveTransfer => {
            let e = decode::<SecurityToken::ApproveTransfer>(log)?;
            (emitter, vec![(Role::From, e.from), (Role::To, e.to)])
        }
        EventKind::Consume => {
            let e = decode::<SecurityToken::Consume>(log)?;
            (emitter, vec![(Role::Consumer, e.consumer)])
        }
        EventKind::NewOrder => {
            let e = decode::<Exchange::NewOrder>(log)?;
            (e.tokenAddress, vec![(Role::Account, e.accountAddress)])
        }
        EventKind::CancelOrder => {
            let e = decode::<Exchange::CancelOrder>(log)?;
            (e.tokenAddress, vec![(Role::Account, e.accountAddress)])
        }
        EventKind::ForceCancelOrder => {
            let e = decode::<Exchange::ForceCancelOrder>(log)?;
            (e.tokenAddress, vec![(Role::Account, e.accountAddress)])
        }
        EventKind::Agree => {
            let e = decode::<Exchange::Agree>(log)?;
            (
                e.tokenAddress,
                vec![(Role::Buyer, e.buyAddress), (Role::Seller, e.sellAddress)],
            )
        }
        EventKind::SettlementOk => {
            let e = decode::<Exchange::SettlementOK>(log)?;
            (
                e.tokenAddress,
                vec![(Role::Buyer, e.buyAddress), (Role::Seller, e.sellAddress)],
            )
        }
        EventKind::SettlementNg => {
            let e = decode::<Exchange::SettlementNG>(log)?;
            (
                e.tokenAddress,
                vec![(Role::Buyer, e.buyAddress), (Role::Seller, e.sellAddress)],
            )
        }
        EventKind::EscrowCreated => {
            let e = decode::<Escrow::EscrowCreated>(log)?;
            (
                e.token,
                vec![(Role::Sender, e.sender), (Role::Recipient, e.recipient)],
            )
        }
        EventKind::EscrowCanceled => {
            let e = decode::<Escrow::EscrowCanceled>(log)?;
            (
                e.token,
                vec![(Role::Sender, e.sender), (Role::Recipient, e.recipient)],
            )
        }
        EventKind::EscrowFinished => {
            let e = decode::<Escrow::EscrowFinished>(log)?;
            (
                e.token,
                vec![(Role::Sender, e.sender), (Role::Recipient, e.recipient)],
            )
        }
        EventKind::HolderChanged => {
            let e = decode::<Escrow::HolderChanged>(log)?;
            (e.token, vec![(Role::From, e.from), (Role::To, e.to)])
        }
        EventKind::DeliveryCreated => {
            let e = decode::<Dvp::DeliveryCreated>(log)?;
            (e.token, vec![(Role::Seller, e.seller), (Role::Buyer, e.buyer)])
        }
        EventKind::DeliveryCanceled => {
            let e = decode::<Dvp::DeliveryCanceled>(log)?;
            (e.token, vec![(Role::Seller, e.seller), (Role::Buyer, e.buyer)])
        }
        EventKind::DeliveryAborted => {
            let e = decode::<Dvp::DeliveryAborted>(log)?;
            (e.token, vec![(Role::Seller, e.seller), (Role::Buyer, e.buyer)])
        }
    };

    Ok(DecodedEvent {
        kind,
        block_number: log.block_number.unwrap_or_default(),
        log_index: log.log_index.unwrap_or_default(),
        transaction_hash: log.transaction_hash.unwrap_or_default(),
        token,
        roles,
        lock_detail,
    })
}

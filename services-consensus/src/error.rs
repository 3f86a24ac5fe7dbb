//! Consensus error taxonomy: one `thiserror` enum per service
//! plus a crate-level wrapper, `#[from]` conversions, `displaydoc`-style
//! doc comments doubling as the `Display` message.
//!
//! Stable numeric error-code prefixes: alias 1xxx, offer 2xxx-4xxx,
//! cert 2xxx, message 3xxx, escrow 4xxx.

use displaydoc::Display;
use services_store::StoreError;
use thiserror::Error;

/// Whether a successful `validate` call actually mutated state. Soft-fail
/// vs hard-fail is encoded in the return type, not the error itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The transaction was fully validated and, in connect mode, applied.
    Applied,
    /// Connect-mode callers should log and continue without mutating state
    /// (referenced-record-missing / storage-soft-fail: log and return
    /// success without mutation).
    SoftSkipped { reason: String },
}

#[derive(Error, Display, Debug)]
pub enum AliasError {
    /// 1000: alias name fails the domain-name regex
    InvalidName,
    /// 1001: nRenewal outside [1, 5]
    InvalidRenewal,
    /// 1002: public value exceeds MAX_VALUE_LENGTH
    PublicValueTooLong,
    /// 1003: private value exceeds MAX_ENCRYPTED_VALUE_LENGTH
    PrivateValueTooLong,
    /// 1004: nHeight is in the future relative to the connecting block
    HeightInFuture,
    /// 1005: activate on a name whose prior entry has not expired
    NotExpired,
    /// 1006: activate with a non-empty private key field
    PrivateKeyNotEmpty,
    /// 1007: update references a guid/name not found in the store
    NotFound,
    /// 1008: update's prior alias input does not match this alias's guid/name
    InputMismatch,
    /// 1009: transfer's private key cipher is missing or unchanged
    TransferMissingKey,
    /// 1010: storage I/O failure
    Store(#[from] StoreError),
}

#[derive(Error, Display, Debug)]
pub enum OfferError {
    /// 2000: linked offer's parent was not found
    ParentNotFound,
    /// 2001: an offer may not link to another linked offer
    ParentIsLinked,
    /// 2002: parent is a wanted-category offer and cannot be resold
    ParentIsWanted,
    /// 2003: offer is not present in the parent's exclusive whitelist
    NotWhitelisted,
    /// 2004: commission is outside the allowed range for this offer
    InvalidCommission,
    /// 2005: parent's child list is already at capacity
    ChildrenAtCapacity,
    /// 2006: quantity is invalid for a certificate-backed offer (must be 1)
    InvalidCertQuantity,
    /// 2007: certificate's owner alias does not match the offer's alias
    CertOwnerMismatch,
    /// 2008: price must be strictly positive
    InvalidPrice,
    /// 2009: payment-option bitmask is not in {1, 2, 3}
    InvalidPaymentOptions,
    /// 2010: currency code is not resolvable in the peg alias at this height
    UnresolvableCurrency,
    /// 2011: accept quantity is zero or exceeds the offer's remaining quantity
    InvalidAcceptQuantity,
    /// 2012: offer is in the wanted category and cannot be purchased
    OfferNotPurchasable,
    /// 2013: merchant (and, if linked, affiliate) payment output is missing or short
    PaymentOutputMissing,
    /// 2014: feedback rating exceeds 5
    InvalidRating,
    /// 2015: feedback from/to name the same party
    SelfFeedback,
    /// 2016: more than 10 feedback items already recorded for this role
    FeedbackLimitReached,
    /// 2017: feedback references an accept/escrow that was not found
    AcceptNotFound,
    /// 2018: wrong party authorized this feedback
    WrongFeedbackParty,
    /// 2019: storage I/O failure
    Store(#[from] StoreError),
    /// 2020: previous alias input does not match the offer's owning alias
    AliasInputMismatch,
    /// 2021: update references a guid not found in the store
    NotFound,
    /// 2022: whitelist discount exceeds 99 (127 is reserved to clear the whitelist)
    InvalidWhitelistDiscount,
    /// 2023: a certificate-backed offer's certificate was not found
    CertNotFound,
    /// 2024: activate on a guid already in use
    GuidInUse,
    /// 2025: quantity is below -1 (the "unlimited" sentinel)
    InvalidQuantity,
}

#[derive(Error, Display, Debug)]
pub enum CertError {
    /// 2100: previous alias input is missing or does not match the owner alias
    OwnerInputMismatch,
    /// 2101: title exceeds MAX_NAME_LENGTH
    TitleTooLong,
    /// 2102: title is empty on activate
    TitleEmpty,
    /// 2103: data exceeds MAX_ENCRYPTED_VALUE_LENGTH
    DataTooLong,
    /// 2104: activate on a guid already in use
    GuidInUse,
    /// 2105: update/transfer references a guid not found in the store
    NotFound,
    /// 2106: transfer did not name a link-alias target
    MissingTransferTarget,
    /// 2107: storage I/O failure
    Store(#[from] StoreError),
}

#[derive(Error, Display, Debug)]
pub enum EscrowError {
    /// 4000: buyer, seller, or arbiter alias was not found
    PartyNotFound,
    /// 4001: referenced offer was not found
    OfferNotFound,
    /// 4002: offer is in the wanted category and cannot be escrowed
    OfferNotPurchasable,
    /// 4003: release is only valid against an ACTIVATE escrow
    NotActive,
    /// 4004: re-release requires the arbiter's authorization
    RereleaseNeedsArbiter,
    /// 4005: refund is only valid against an ACTIVATE escrow
    NotRefundable,
    /// 4006: re-refund requires the arbiter's authorization
    RerefundNeedsArbiter,
    /// 4007: complete requires a prior RELEASE or REFUND transition
    NotReleasedOrRefunded,
    /// 4008: the raw settlement transaction does not pay the expected amounts
    SettlementAmountMismatch,
    /// 4009: authorizing alias input does not match the payload's link alias
    WrongParty,
    /// 4010: feedback rating exceeds 5
    InvalidRating,
    /// 4011: feedback from/to name the same party
    SelfFeedback,
    /// 4012: more than 10 feedback items already recorded for this role
    FeedbackLimitReached,
    /// 4013: storage I/O failure
    Store(#[from] StoreError),
    /// 4014: referenced escrow was not found
    NotFound,
}

#[derive(Error, Display, Debug)]
pub enum MessageError {
    /// 3000: `to` alias was not found
    ToAliasNotFound,
    /// 3001: storage I/O failure
    Store(#[from] StoreError),
}

/// Malformed-transaction faults common to every service (error class 1),
/// caught by C3/C4 before a service ever sees the transaction.
#[derive(Error, Display, Debug)]
pub enum MalformedTransactionError {
    /// transaction is a coinbase
    Coinbase,
    /// transaction does not carry SYSCOIN_TX_VERSION
    WrongVersion,
    /// service output script has the wrong argument arity for its op
    WrongArity,
    /// data output is missing or not a well-formed OP_RETURN
    MissingDataOutput,
    /// data output failed to parse as the op's claimed record type
    DataParseFailure,
    /// the commitment in the data output disagrees with the one in the script
    CommitmentMismatch,
    /// more than one service output appears in this transaction
    DuplicateServiceOutput,
    /// the data output's amount is below the minimum storage fee
    InsufficientFee,
    /// unrecognized service operation code
    UnknownOp,
}

#[derive(Error, Display, Debug)]
pub enum ServiceError {
    /// {0}
    Malformed(#[from] MalformedTransactionError),
    /// alias: {0}
    Alias(#[from] AliasError),
    /// offer: {0}
    Offer(#[from] OfferError),
    /// certificate: {0}
    Cert(#[from] CertError),
    /// escrow: {0}
    Escrow(#[from] EscrowError),
    /// message: {0}
    Message(#[from] MessageError),
}


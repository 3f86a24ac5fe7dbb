//! End-to-end scenarios driving the public validator surface the way a
//! block connector would: seed a store, build the record(s) a wallet would
//! submit, and check both the `Outcome` and the resulting stored state.

use services_chain::{
    amount::Amount,
    constants::payment_options,
    guid::Guid,
    height::Height,
    parameters::Network,
    records::{Alias, Certificate, Escrow, EscrowOp, Offer, OfferAccept},
    transaction::Txid,
    transparent::{OutPoint, Output},
    utxo::{BlockSource, UtxoView},
};
use services_consensus::{
    alias::{self, AliasOp},
    escrow,
    offer::{self, OfferOp},
    prevout::{PreviousAlias, PreviousServiceInputs},
    state::{Mode, ValidatorState},
    Outcome,
};
use services_store::{Config, Stores};

struct NoUtxo;
impl UtxoView for NoUtxo {
    fn output(&self, _outpoint: &OutPoint) -> Option<Output> {
        None
    }
}

struct FakeBlockSource(Vec<Output>);
impl BlockSource for FakeBlockSource {
    type Error = String;
    fn raw_transaction_paid(&self, _hex: &str) -> Result<Vec<Output>, String> {
        Ok(self.0.clone())
    }
}

// Two distinct real uncompressed secp256k1 public keys, so tests that need
// two parties with different derived addresses don't have to fabricate
// curve points.
const PUBKEY_A: [u8; 65] = [
    4, 80, 134, 58, 214, 74, 135, 174, 138, 47, 232, 60, 26, 241, 168, 64, 60, 181, 63, 83, 228,
    134, 216, 81, 29, 173, 138, 4, 136, 126, 91, 35, 82, 44, 212, 112, 36, 52, 83, 162, 153, 250,
    158, 119, 35, 119, 22, 16, 58, 188, 17, 161, 223, 56, 133, 94, 214, 242, 238, 24, 126, 156, 88,
    43, 166,
];
const PUBKEY_B: [u8; 65] = [
    4, 45, 115, 49, 52, 94, 13, 166, 171, 17, 37, 235, 57, 72, 138, 84, 42, 153, 35, 243, 28, 88,
    92, 32, 17, 77, 33, 26, 159, 107, 201, 243, 191, 85, 209, 216, 67, 203, 124, 241, 211, 107, 50,
    209, 203, 0, 210, 241, 64, 239, 2, 142, 114, 106, 25, 167, 102, 246, 202, 124, 239, 123, 149,
    101, 131,
];

fn stores() -> Stores {
    Stores::open(&Config::ephemeral(), Network::Regtest).unwrap()
}

fn sample_alias(name: &str, pubkey: &[u8], height: Height) -> Alias {
    Alias {
        name: name.to_string(),
        guid: Guid(name.as_bytes().to_vec()),
        pubkey: pubkey.to_vec(),
        public_value: vec![],
        private_value: vec![],
        private_key: vec![],
        renewal: 1,
        safety_level: 0,
        safe_search: true,
        rating_buyer: Default::default(),
        rating_seller: Default::default(),
        rating_arbiter: Default::default(),
        height,
        txid: Txid([height.value() as u8; 32]),
    }
}

fn put_alias(stores: &Stores, name: &str, pubkey: &[u8], height: Height) -> Guid {
    let guid = Guid(name.as_bytes().to_vec());
    stores.aliases.put(&guid, sample_alias(name, pubkey, height)).unwrap();
    guid
}

fn alias_input(name: &str) -> PreviousServiceInputs {
    PreviousServiceInputs {
        alias: Some(PreviousAlias {
                guid: Guid(name.as_bytes().to_vec()),
                name: name.to_string(),
        }),
        ..Default::default()
    }
}

fn base_offer(guid: &str, alias: &str, price: i64, quantity: i64) -> Offer {
    Offer {
        guid: Guid(guid.as_bytes().to_vec()),
        alias: Guid(alias.as_bytes().to_vec()),
        title: b"widget".to_vec(),
        category: b"electronics".to_vec(),
        description: vec![],
        currency_code: b"SYS".to_vec(),
        alias_peg: Guid(vec![]),
        price: Amount(price),
        quantity,
        commission: 0,
        linked_offer: Guid(vec![]),
        cert: Guid(vec![]),
        payment_options: payment_options::SYS,
        private: false,
        safety_level: 0,
        safe_search: true,
        whitelist: Default::default(),
        children: vec![],
        sold: 0,
        geo_location: vec![],
        height: Height(1),
        txid: Txid([1u8; 32]),
    }
}

// Scenario 1: an alias activate against a name whose prior entry has
// expired succeeds; against one that has not, it's rejected.
#[test]
fn scenario_alias_expiry_gates_reactivation() {
    services_test::init();
    let stores = stores();
    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);

    stores
    .aliases
    .put(
        &Guid(b"buyeralias".to_vec()),
        sample_alias("buyeralias", &PUBKEY_A, Height(0)))
    .unwrap();

    // Too soon: the regtest expiry depth (1440 blocks) hasn't elapsed.
    let too_soon = sample_alias("buyeralias", &PUBKEY_B, Height(10));
    let err = alias::check_alias_inputs(
        &mut state,
        Mode::Connect { height: Height(10) },
        Height(10),
        AliasOp::Activate,
        too_soon)
    .unwrap_err();
    assert!(matches!(err, services_consensus::error::AliasError::NotExpired));

    // Past the expiry depth: reactivation succeeds and replaces the pubkey.
    let past_expiry = Height(1_442);
    let reactivated = sample_alias("buyeralias", &PUBKEY_B, past_expiry);
    let outcome = alias::check_alias_inputs(
        &mut state,
        Mode::Connect { height: past_expiry },
        past_expiry,
        AliasOp::Activate,
        reactivated)
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    let stored = stores.aliases.current(&Guid(b"buyeralias".to_vec())).unwrap().unwrap();
    assert_eq!(stored.pubkey, PUBKEY_B.to_vec());
}

// Scenario 2: an offer priced in a foreign currency resolves its buyer
// price through the versioned sysrates.peg document, and the purchase is
// only accepted once an output actually pays the merchant that amount.
#[test]
fn scenario_peg_converted_accept_requires_the_converted_payment() {
    services_test::init();
    let stores = stores();
    let peg_guid = put_alias(&stores, "sysrates.peg", &[], Height(1));
    stores
    .aliases
    .put(
        &peg_guid,
        Alias {
            public_value: br#"{"rates":[{"currency":"USD","rate":2.0,"precision":2}]}"#.to_vec(),
            ..sample_alias("sysrates.peg", &[], Height(1))
    })
    .unwrap();
    put_alias(&stores, "merchant", &PUBKEY_A, Height(1));

    let mut offer = base_offer("O1", "merchant", 100, 10);
    offer.currency_code = b"USD".to_vec();
    offer.alias_peg = peg_guid;
    let offer_guid = Guid(b"O1".to_vec());
    stores.offers.put(&offer_guid, offer.clone()).unwrap();

    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);
    let resolved = offer::resolve_accept_price(
        &state,
        &offer,
        &Guid(b"buyeralias".to_vec()),
        Height(5),
        100_000_000)
    .unwrap()
    .expect("USD is resolvable against the peg document");
    assert!(resolved.buyer_price_per_unit > 0);
    assert_eq!(resolved.affiliate_commission_per_unit, 0);

    let qty = 3u64;
    let buyer_total = resolved.buyer_price_per_unit * qty as i64;
    let merchant_address = sample_alias("merchant", &PUBKEY_A, Height(1))
    .pubkey_address(Network::Regtest)
    .unwrap();

    let accept = OfferAccept {
        accept_guid: Guid(b"A1".to_vec()),
        offer_guid: offer_guid.clone(),
        accept_height: Height(5),
        qty,
        price: Amount(0),
        btc_txid: vec![],
        buyer_alias: Guid(b"buyeralias".to_vec()),
        message: vec![],
        feedback: vec![],
        height: Height(5),
        txid: Txid([9u8; 32]),
    };

    // No payment output at all: rejected.
    let err = offer::check_offer_accept_purchase(
        &mut state,
        Mode::JustCheck,
        &[],
        100_000_000,
        accept.clone())
    .unwrap_err();
    assert!(matches!(err, services_consensus::error::OfferError::PaymentOutputMissing));

    // A short payment: still rejected.
    let short_outputs = vec![Output {
            value: Amount(buyer_total - 1),
            lock_script: merchant_address.lock_script(),
    }];
    let err = offer::check_offer_accept_purchase(
        &mut state,
        Mode::JustCheck,
        &short_outputs,
        100_000_000,
        accept.clone())
    .unwrap_err();
    assert!(matches!(err, services_consensus::error::OfferError::PaymentOutputMissing));

    // Paying the converted total in full succeeds and deducts stock.
    let outputs = vec![Output {
            value: Amount(buyer_total),
            lock_script: merchant_address.lock_script(),
    }];
    let outcome = offer::check_offer_accept_purchase(
        &mut state,
        Mode::Connect { height: Height(5) },
        &outputs,
        100_000_000,
        accept)
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.offers.current(&offer_guid).unwrap().unwrap().quantity, 7);
}

// Scenario 3: a linked (reseller) offer that has independently marked up
// its own price over its parent's splits the buyer's payment between the
// merchant (at the parent's price) and the affiliate (the markup).
#[test]
fn scenario_linked_offer_splits_payout_between_merchant_and_affiliate() {
    services_test::init();
    let stores = stores();
    put_alias(&stores, "merchant", &PUBKEY_A, Height(1));
    put_alias(&stores, "reseller", &PUBKEY_B, Height(1));

    let parent_guid = Guid(b"O1".to_vec());
    stores.offers.put(&parent_guid, base_offer("O1", "merchant", 100, 10)).unwrap();

    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);

    // Activate the linked child: quantity/price/cert/alias_peg are copied
    // from the parent regardless of what the submitted record claims.
    let mut child = base_offer("O2", "reseller", 999, 999);
    child.linked_offer = parent_guid.clone();
    let outcome = offer::check_offer_inputs(
        &mut state,
        Mode::Connect { height: Height(2) },
        &alias_input("reseller"),
        OfferOp::Activate,
        child)
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    let child_guid = Guid(b"O2".to_vec());
    let stored_child = stores.offers.current(&child_guid).unwrap().unwrap();
    assert_eq!(stored_child.price.value(), 100);
    assert_eq!(stored_child.quantity, 10);
    assert_eq!(
        stores.offers.current(&parent_guid).unwrap().unwrap().children,
        vec![child_guid.clone()]
    );

    // The reseller marks its own offer up to 130: linked updates don't
    // auto-resync price, so this sticks independently of the parent.
    let mut marked_up = stored_child.clone();
    marked_up.price = Amount(130);
    offer::check_offer_inputs(
        &mut state,
        Mode::Connect { height: Height(3) },
        &alias_input("reseller"),
        OfferOp::Update,
        marked_up)
    .unwrap();

    let child = stores.offers.current(&child_guid).unwrap().unwrap();
    let resolved = offer::resolve_accept_price(
        &state,
        &child,
        &Guid(b"buyeralias".to_vec()),
        Height(3),
        100_000_000)
    .unwrap()
    .unwrap();
    assert_eq!(resolved.buyer_price_per_unit, 100);
    assert_eq!(resolved.affiliate_commission_per_unit, 30);

    let qty = 2u64;
    let merchant_address =
    sample_alias("merchant", &PUBKEY_A, Height(1)).pubkey_address(Network::Regtest).unwrap();
    let affiliate_address =
    sample_alias("reseller", &PUBKEY_B, Height(1)).pubkey_address(Network::Regtest).unwrap();

    let accept = OfferAccept {
        accept_guid: Guid(b"A1".to_vec()),
        offer_guid: child_guid.clone(),
        accept_height: Height(3),
        qty,
        price: Amount(0),
        btc_txid: vec![],
        buyer_alias: Guid(b"buyeralias".to_vec()),
        message: vec![],
        feedback: vec![],
        height: Height(4),
        txid: Txid([9u8; 32]),
    };

    // Pays the merchant but stiffs the affiliate: rejected.
    let merchant_only = vec![Output {
            value: Amount(100 * qty as i64),
            lock_script: merchant_address.lock_script(),
    }];
    let err = offer::check_offer_accept_purchase(
        &mut state,
        Mode::JustCheck,
        &merchant_only,
        100_000_000,
        accept.clone())
    .unwrap_err();
    assert!(matches!(err, services_consensus::error::OfferError::PaymentOutputMissing));

    let full_payout = vec![
        Output {
            value: Amount(100 * qty as i64),
            lock_script: merchant_address.lock_script(),
        },
        Output {
            value: Amount(30 * qty as i64),
            lock_script: affiliate_address.lock_script(),
        },
    ];
    let outcome = offer::check_offer_accept_purchase(
        &mut state,
        Mode::Connect { height: Height(4) },
        &full_payout,
        100_000_000,
        accept)
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
}

// Scenario 4: an escrow released by the buyer is claimed against a raw
// settlement transaction that must pay both the merchant and the arbiter's
// fee (max(0.5% of sale, min relay fee)).
#[test]
fn scenario_escrow_release_then_settlement_pays_merchant_and_arbiter() {
    services_test::init();
    let stores = stores();
    put_alias(&stores, "buyeralias", &PUBKEY_A, Height(1));
    put_alias(&stores, "merchant", &PUBKEY_B, Height(1));
    put_alias(&stores, "arbiteralias", &PUBKEY_A, Height(1));
    let offer_guid = Guid(b"O1".to_vec());
    stores.offers.put(&offer_guid, base_offer("O1", "merchant", 100, 10)).unwrap();

    let escrow = Escrow {
        guid: Guid(b"E1".to_vec()),
        buyer_alias: Guid(b"buyeralias".to_vec()),
        seller_alias: Guid(b"merchant".to_vec()),
        arbiter_alias: Guid(b"arbiteralias".to_vec()),
        offer_guid: offer_guid.clone(),
        qty: 2,
        payment_message: vec![],
        redeem_script: vec![],
        foreign_funding_tx: String::new(),
        raw_tx: vec![],
        op: EscrowOp::ACTIVATE,
        accept_height: Height(1),
        feedback: vec![],
        height: Height(1),
        txid: Txid([2u8; 32]),
    };

    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);
    let outcome =
    escrow::check_escrow_activate(&mut state, Mode::Connect { height: Height(2) }, escrow).unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.offers.current(&offer_guid).unwrap().unwrap().quantity, 8);

    let guid = Guid(b"E1".to_vec());
    let outcome = escrow::check_escrow_release(
        &mut state,
        Mode::Connect { height: Height(3) },
        &alias_input("buyeralias"),
        &guid,
        vec![],
        Height(3),
        Txid([3u8; 32]))
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.escrows.current(&guid).unwrap().unwrap().op, EscrowOp::RELEASE);

    let sale_total = 100 * 2; // price * qty, SYS currency, no discount
    let min_relay_fee = 1_000;
    let fee = escrow::arbiter_fee(sale_total, min_relay_fee);

    let merchant_address =
    sample_alias("merchant", &PUBKEY_B, Height(1)).pubkey_address(Network::Regtest).unwrap();
    let arbiter_address =
    sample_alias("arbiteralias", &PUBKEY_A, Height(1)).pubkey_address(Network::Regtest).unwrap();

    // Pays the merchant but not the arbiter's fee: rejected.
    let incomplete = FakeBlockSource(vec![Output {
            value: Amount(sale_total),
            lock_script: merchant_address.lock_script(),
    }]);
    let err = escrow::check_escrow_settlement(
        &mut state,
        Mode::JustCheck,
        &alias_input("merchant"),
        &incomplete,
        &guid,
        "deadbeef",
        min_relay_fee,
        100_000_000,
        Height(4),
        Txid([4u8; 32]))
    .unwrap_err();
    assert!(matches!(
            err,
            services_consensus::error::EscrowError::SettlementAmountMismatch
    ));

    let full = FakeBlockSource(vec![
        Output {
            value: Amount(sale_total),
            lock_script: merchant_address.lock_script(),
        },
        Output {
            value: Amount(fee),
            lock_script: arbiter_address.lock_script(),
        },
    ]);
    let outcome = escrow::check_escrow_settlement(
        &mut state,
        Mode::Connect { height: Height(4) },
        &alias_input("merchant"),
        &full,
        &guid,
        "deadbeef",
        min_relay_fee,
        100_000_000,
        Height(4),
        Txid([4u8; 32]))
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.escrows.current(&guid).unwrap().unwrap().op, EscrowOp::COMPLETE);
}

// Scenario 5: a seller-initiated refund restores the offer's quantity and,
// on settlement, pays the buyer back the sale total plus the fee the
// arbiter would otherwise have earned -- the arbiter itself is never paid.
#[test]
fn scenario_escrow_refund_then_settlement_skips_the_arbiter() {
    services_test::init();
    let stores = stores();
    put_alias(&stores, "buyeralias", &PUBKEY_A, Height(1));
    put_alias(&stores, "merchant", &PUBKEY_B, Height(1));
    put_alias(&stores, "arbiteralias", &PUBKEY_A, Height(1));
    let offer_guid = Guid(b"O1".to_vec());
    stores.offers.put(&offer_guid, base_offer("O1", "merchant", 100, 8)).unwrap();

    let escrow = Escrow {
        guid: Guid(b"E1".to_vec()),
        buyer_alias: Guid(b"buyeralias".to_vec()),
        seller_alias: Guid(b"merchant".to_vec()),
        arbiter_alias: Guid(b"arbiteralias".to_vec()),
        offer_guid: offer_guid.clone(),
        qty: 2,
        payment_message: vec![],
        redeem_script: vec![],
        foreign_funding_tx: String::new(),
        raw_tx: vec![],
        op: EscrowOp::ACTIVATE,
        accept_height: Height(1),
        feedback: vec![],
        height: Height(1),
        txid: Txid([2u8; 32]),
    };
    let guid = Guid(b"E1".to_vec());
    stores.escrows.put(&guid, escrow).unwrap();

    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);

    // Seller-initiated refund (authorized by the seller's own alias input).
    let outcome = escrow::check_escrow_refund(
        &mut state,
        Mode::Connect { height: Height(2) },
        &alias_input("merchant"),
        &guid,
        vec![],
        Height(2),
        Txid([3u8; 32]))
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.offers.current(&offer_guid).unwrap().unwrap().quantity, 10);
    assert_eq!(stores.escrows.current(&guid).unwrap().unwrap().op, EscrowOp::REFUND);

    let sale_total = 100 * 2;
    let min_relay_fee = 1_000;
    let fee = escrow::arbiter_fee(sale_total, min_relay_fee);
    let buyer_address =
    sample_alias("buyeralias", &PUBKEY_A, Height(1)).pubkey_address(Network::Regtest).unwrap();

    // Only the sale total, no fee: rejected.
    let short = FakeBlockSource(vec![Output {
            value: Amount(sale_total),
            lock_script: buyer_address.lock_script(),
    }]);
    let err = escrow::check_escrow_settlement(
        &mut state,
        Mode::JustCheck,
        &alias_input("buyeralias"),
        &short,
        &guid,
        "deadbeef",
        min_relay_fee,
        100_000_000,
        Height(3),
        Txid([4u8; 32]))
    .unwrap_err();
    assert!(matches!(
            err,
            services_consensus::error::EscrowError::SettlementAmountMismatch
    ));

    // Sale total plus the arbiter's would-be fee, paid to the buyer alone.
    let full = FakeBlockSource(vec![Output {
            value: Amount(sale_total + fee),
            lock_script: buyer_address.lock_script(),
    }]);
    let outcome = escrow::check_escrow_settlement(
        &mut state,
        Mode::Connect { height: Height(3) },
        &alias_input("buyeralias"),
        &full,
        &guid,
        "deadbeef",
        min_relay_fee,
        100_000_000,
        Height(3),
        Txid([4u8; 32]))
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stores.escrows.current(&guid).unwrap().unwrap().op, EscrowOp::COMPLETE);
}

// Scenario 6: writing the sysban alias's public value cascades severity
// onto the listed alias, certificate, and offer -- and an offer ban
// cascades further onto that offer's children.
#[test]
fn scenario_sysban_cascades_to_offer_children() {
    services_test::init();
    let stores = stores();
    put_alias(&stores, "baduser", &PUBKEY_A, Height(1));

    let cert_guid = Guid(b"C1".to_vec());
    stores
    .certs
    .put(
        &cert_guid,
        Certificate {
            guid: cert_guid.clone(),
            title: b"title".to_vec(),
            category: b"electronics".to_vec(),
            data: b"ciphertext".to_vec(),
            private: false,
            owner_alias: Guid(b"baduser".to_vec()),
            pending_transfer_alias: Guid(vec![]),
            safety_level: 0,
            height: Height(1),
            txid: Txid([1u8; 32]),
    })
    .unwrap();

    let parent_guid = Guid(b"O1".to_vec());
    let mut parent = base_offer("O1", "baduser", 100, 10);
    let child_guid = Guid(b"O2".to_vec());
    parent.children.push(child_guid.clone());
    stores.offers.put(&parent_guid, parent).unwrap();
    stores.offers.put(&child_guid, base_offer("O2", "baduser", 100, 10)).unwrap();

    let ban_doc = format!(
        r#"{{"aliases":[{{"id":"{}","severity":9}}],"certs":[{{"id":"{}","severity":7}}],"offers":[{{"id":"{}","severity":5}}]}}"#,
        hex::encode(b"baduser"),
        hex::encode(b"C1"),
        hex::encode(b"O1")
    );
    let sysban = Alias {
        public_value: ban_doc.into_bytes(),
        ..sample_alias("sysban", &[], Height(5))
    };

    let utxo = NoUtxo;
    let mut state = ValidatorState::new(&stores, &utxo);
    let outcome = alias::check_alias_inputs(
        &mut state,
        Mode::Connect { height: Height(5) },
        Height(5),
        AliasOp::Activate,
        sysban)
    .unwrap();
    assert_eq!(outcome, Outcome::Applied);

    assert_eq!(
        stores.aliases.current(&Guid(b"baduser".to_vec())).unwrap().unwrap().safety_level,
        9
    );
    assert_eq!(stores.certs.current(&cert_guid).unwrap().unwrap().safety_level, 7);
    assert_eq!(stores.offers.current(&parent_guid).unwrap().unwrap().safety_level, 5);
    assert_eq!(stores.offers.current(&child_guid).unwrap().unwrap().safety_level, 5);
}

// Regression test: `version_at` returns the most recently *inserted*
// version whose height satisfies the query, not the version with the
// numerically closest height. Two updates landing in the same connecting
// block share a height, and the second one committed must win even though
// both entries are equally "eligible" for any height-pinned lookup at or
// after that block.
#[test]
fn parent_updated_same_block() {
    services_test::init();
    let stores = stores();
    let guid = Guid(b"O1".to_vec());

    let mut first_update = base_offer("O1", "merchant", 100, 10);
    first_update.height = Height(5);
    first_update.txid = Txid([1u8; 32]);
    stores.offers.put(&guid, first_update).unwrap();

    let mut second_update = base_offer("O1", "merchant", 150, 10);
    second_update.height = Height(5);
    second_update.txid = Txid([2u8; 32]);
    stores.offers.put(&guid, second_update).unwrap();

    let resolved = stores.offers.version_at(&guid, Height(5)).unwrap().unwrap();
    assert_eq!(resolved.price.value(), 150);

    // A purchase accepted at this height must be priced against the second
    // update, not the first, since `resolve_accept_price` pins the peg (and
    // here, implicitly, the offer lookup itself) to `accept_height`.
    let history = stores.offers.history(&guid).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].price.value(), 150);
}

//! Property tests for decision engine invariants.
//!
//! Uses proptest to verify, for arbitrary indicator histories and books:
//! 1. Mutual exclusivity: never a Buy open and a Sell open on the same bar
//! 2. At most one open per bar, however many closes precede it
//! 3. Every close is issued before the open
//! 4. Unreadable history issues nothing
//! 5. Only positions carrying the engine's label are ever closed

use proptest::prelude::*;

use barbot_core::broker::{PaperBroker, PositionBook, SharedBroker};
use barbot_core::domain::{Position, PositionId, SymbolSpec, TradeSide};
use barbot_core::engine::{BarDecision, DecisionEngine, EngineSettings};
use barbot_core::series::IndicatorSample;
use barbot_core::signal::{CrossoverRule, SignalRule, ZeroCrossRule};

const LABEL: &str = "prop";

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        3 => -10.0..10.0_f64,
        1 => Just(0.0),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_value(), 2..8)
}

fn arb_side() -> impl Strategy<Value = TradeSide> {
    prop_oneof![Just(TradeSide::Buy), Just(TradeSide::Sell)]
}

/// (side, owned by this engine?)
fn arb_book() -> impl Strategy<Value = Vec<(TradeSide, bool)>> {
    prop::collection::vec((arb_side(), any::<bool>()), 0..6)
}

// ── Helpers ──────────────────────────────────────────────────────────

fn broker_with(book: &[(TradeSide, bool)]) -> SharedBroker {
    let mut broker = PaperBroker::new(SymbolSpec::default());
    broker.set_mark(1.1);
    for (i, (side, owned)) in book.iter().enumerate() {
        broker.insert_position(Position {
            id: PositionId::new(format!("p{i}")),
            symbol: "EURUSD".into(),
            side: *side,
            volume: 1000.0,
            label: if *owned { LABEL.into() } else { "other".into() },
            entry_price: 1.1,
            stop_loss: None,
            take_profit: None,
        });
    }
    SharedBroker::new(broker)
}

fn decide<R: SignalRule>(rule: R, broker: &SharedBroker) -> BarDecision {
    let settings = EngineSettings::new(LABEL, 1000.0, 10.0, 10.0);
    DecisionEngine::new(rule, broker.clone(), broker.clone(), settings).on_bar_closed()
}

fn check_shape(decision: &BarDecision) -> Result<(), TestCaseError> {
    prop_assert!(decision.opens().count() <= 1);

    // closes form a prefix of the command list
    let first_open = decision
        .commands
        .iter()
        .position(|c| c.command.is_open())
        .unwrap_or(decision.commands.len());
    prop_assert!(decision.commands[first_open..]
        .iter()
        .all(|c| c.command.is_open()));
    Ok(())
}

// ── 1-3. Command shape ───────────────────────────────────────────────

proptest! {
    #[test]
    fn zero_cross_never_opens_both_sides(history in arb_history(), book in arb_book()) {
        let broker = broker_with(&book);
        let rule = ZeroCrossRule::new(IndicatorSample::from_values(&history).unwrap().reader());
        let decision = decide(rule, &broker);

        let sides: Vec<TradeSide> = decision
            .commands
            .iter()
            .filter_map(|c| c.command.open_side())
            .collect();
        prop_assert!(!(sides.contains(&TradeSide::Buy) && sides.contains(&TradeSide::Sell)));
        check_shape(&decision)?;
    }

    #[test]
    fn crossover_issues_closes_then_one_open(
        fast in arb_history(),
        slow in arb_history(),
        book in arb_book(),
    ) {
        let broker = broker_with(&book);
        let rule = CrossoverRule::new(
            IndicatorSample::from_values(&fast).unwrap().reader(),
            IndicatorSample::from_values(&slow).unwrap().reader(),
        );
        let decision = decide(rule, &broker);
        check_shape(&decision)?;

        // after a crossover entry nothing owned is left on the opposite side
        if let Some(side) = decision.opened_side() {
            let owned = broker.open_positions(LABEL);
            prop_assert!(owned.iter().all(|p| p.side == side));
        } else {
            prop_assert!(decision.is_empty());
        }
    }
}

// ── 4. Unreadable history ────────────────────────────────────────────

proptest! {
    #[test]
    fn short_history_issues_nothing(value in arb_value(), book in arb_book()) {
        let broker = broker_with(&book);
        let before = broker.lock().positions().len();
        let rule = ZeroCrossRule::new(IndicatorSample::from_values(&[value]).unwrap().reader());
        let decision = decide(rule, &broker);

        prop_assert!(decision.is_skipped());
        prop_assert!(decision.is_empty());
        prop_assert_eq!(broker.lock().positions().len(), before);
    }
}

// ── 5. Label scoping ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn foreign_positions_survive(history in arb_history(), book in arb_book()) {
        let broker = broker_with(&book);
        let foreign = book.iter().filter(|(_, owned)| !owned).count();
        let rule = ZeroCrossRule::new(IndicatorSample::from_values(&history).unwrap().reader());
        decide(rule, &broker);

        prop_assert_eq!(broker.open_positions("other").len(), foreign);
    }
}

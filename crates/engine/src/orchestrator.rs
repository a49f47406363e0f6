//! Position lifecycle orchestration.
//!
//! One call to [`PositionManager::run_once`] performs one full pass:
//! snapshot positions, open a short on every watchlist symbol without
//! exposure, evaluate every open position's ROE, and reverse the ones
//! below the loss threshold. The pass then terminates; looping is an
//! external scheduler's concern.

use crate::gateway::{LiveGateway, SimulatedGateway};
use crate::oracle::PriceOracle;
use crate::report::{PositionRow, RunReport, SymbolFailure};
use crate::resolver::AssetResolver;
use contra_core::config::TradingConfig;
use contra_core::error::RiskError;
use contra_core::roe::roe;
use contra_core::sizing::{order_quantity, risk_amount};
use contra_core::traits::{ExchangeApi, OrderGateway};
use contra_core::types::{OrderRequest, OrderResult, Position, Side};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Drives the open/evaluate cycle over the configured watchlist.
pub struct PositionManager {
    api: Arc<dyn ExchangeApi>,
    resolver: AssetResolver,
    oracle: PriceOracle,
    gateway: Arc<dyn OrderGateway>,
    settings: TradingConfig,
}

impl PositionManager {
    /// Creates a manager over the given capability handle and gateway.
    pub fn new(
        api: Arc<dyn ExchangeApi>,
        gateway: Arc<dyn OrderGateway>,
        settings: TradingConfig,
    ) -> Self {
        Self {
            resolver: AssetResolver::new(api.clone()),
            oracle: PriceOracle::new(api.clone()),
            api,
            gateway,
            settings,
        }
    }

    /// Creates a manager with the gateway variant selected by
    /// `settings.simulation`.
    pub fn with_default_gateway(api: Arc<dyn ExchangeApi>, settings: TradingConfig) -> Self {
        let gateway: Arc<dyn OrderGateway> = if settings.simulation {
            Arc::new(SimulatedGateway)
        } else {
            Arc::new(LiveGateway::new(api.clone()))
        };
        Self::new(api, gateway, settings)
    }

    /// Executes one full pass and returns its report.
    ///
    /// Per-symbol failures in either phase are logged, recorded in the
    /// report, and do not halt the rest of the pass. Only the initial
    /// position snapshot is fail-fast: without it neither phase can make a
    /// sound decision.
    ///
    /// # Errors
    /// Returns `AccountQueryFailed` if the position snapshot cannot be
    /// fetched.
    pub async fn run_once(&self) -> Result<RunReport, RiskError> {
        let snapshot = self
            .api
            .positions()
            .await
            .map_err(|e| RiskError::AccountQueryFailed(e.to_string()))?;

        let open: Vec<Position> = snapshot.into_iter().filter(Position::is_open).collect();
        tracing::info!(open = open.len(), "position snapshot taken");

        let mut report = RunReport::default();
        self.open_phase(&open, &mut report).await;
        self.evaluate_phase(&open, &mut report).await;

        Ok(report)
    }

    /// Opens a short on every watchlist symbol with no exposure.
    ///
    /// Symbols are processed strictly in watchlist order, each placement
    /// completing before the next symbol starts. Each sizing decision
    /// re-reads the account balance, so a later open sees the margin
    /// consumed by an earlier one; opening concurrently would size every
    /// symbol against the same stale reading.
    async fn open_phase(&self, open: &[Position], report: &mut RunReport) {
        for symbol in &self.settings.watchlist {
            if open.iter().any(|p| p.symbol == *symbol) {
                tracing::debug!(symbol = %symbol, "already open, skipping");
                continue;
            }

            match self.open_short(symbol).await {
                Ok(result) => {
                    tracing::info!(symbol = %symbol, quantity = %result.quantity, "opened short position");
                    report.opened.push(result);
                }
                Err(e) => {
                    tracing::error!(symbol = %symbol, error = %e, "failed to open position");
                    report.failures.push(SymbolFailure {
                        symbol: symbol.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Computes ROE for every open position and reverses breaches.
    async fn evaluate_phase(&self, open: &[Position], report: &mut RunReport) {
        for position in open {
            match self.evaluate(position, report).await {
                Ok(()) => {}
                Err(e) => {
                    tracing::error!(symbol = %position.symbol, error = %e, "failed to evaluate position");
                    report.failures.push(SymbolFailure {
                        symbol: position.symbol.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn evaluate(
        &self,
        position: &Position,
        report: &mut RunReport,
    ) -> Result<(), RiskError> {
        let value = roe(position)?;
        report.rows.push(PositionRow {
            symbol: position.symbol.clone(),
            roe: value,
            unrealized_profit: position.unrealized_profit,
        });

        if value < self.settings.reversal_roe_threshold {
            tracing::warn!(symbol = %position.symbol, roe = %value, "ROE below threshold, reversing");
            let result = self.reverse(position).await?;
            report.reversals.push(result);
        }

        Ok(())
    }

    async fn open_short(&self, symbol: &str) -> Result<OrderResult, RiskError> {
        let quantity = self.sized_quantity(symbol).await?;
        let order = OrderRequest::market(symbol, Side::Sell, quantity, self.settings.leverage);
        self.gateway.place(&order).await
    }

    /// Flips a position: opposite side, double the normal size.
    async fn reverse(&self, position: &Position) -> Result<OrderResult, RiskError> {
        let quantity =
            self.sized_quantity(&position.symbol).await? * self.settings.reversal_size_multiplier;
        let order = OrderRequest::market(
            &position.symbol,
            position.reversal_side(),
            quantity,
            self.settings.leverage,
        );
        self.gateway.place(&order).await
    }

    /// One sizing decision: fresh balance, resolved constraints, fresh
    /// price.
    async fn sized_quantity(&self, symbol: &str) -> Result<Decimal, RiskError> {
        let account = self
            .api
            .account()
            .await
            .map_err(|e| RiskError::AccountQueryFailed(e.to_string()))?;
        let info = self.resolver.resolve(symbol).await?;
        let price = self.oracle.current_price(symbol).await?;

        let notional = risk_amount(
            account.available_balance,
            self.settings.risk_fraction,
            info.min_notional,
        );
        Ok(order_quantity(notional, price, info.base_precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use contra_core::types::{AccountSnapshot, AssetInfo};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Exchange double: canned data plus submission recording. The
    /// in-flight gauge watches for overlapping submissions.
    struct StubExchange {
        assets: Vec<AssetInfo>,
        prices: HashMap<String, Decimal>,
        balance: Decimal,
        positions: Vec<Position>,
        orders: Mutex<Vec<OrderRequest>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail_snapshot: bool,
    }

    impl StubExchange {
        fn new() -> Self {
            Self {
                assets: vec![
                    asset("XRPUSDT", 1, dec!(5)),
                    asset("DOGEUSDT", 0, dec!(5)),
                    asset("ADAUSDT", 0, dec!(5)),
                ],
                prices: HashMap::from([
                    ("XRPUSDT".to_string(), dec!(0.5)),
                    ("DOGEUSDT".to_string(), dec!(0.1)),
                    ("ADAUSDT".to_string(), dec!(0.4)),
                ]),
                balance: dec!(1000),
                positions: Vec::new(),
                orders: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fail_snapshot: false,
            }
        }

        fn recorded_orders(&self) -> Vec<OrderRequest> {
            self.orders.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExchangeApi for StubExchange {
        async fn exchange_metadata(&self) -> Result<Vec<AssetInfo>> {
            Ok(self.assets.clone())
        }

        async fn prices(&self) -> Result<HashMap<String, Decimal>> {
            Ok(self.prices.clone())
        }

        async fn account(&self) -> Result<AccountSnapshot> {
            Ok(AccountSnapshot {
                available_balance: self.balance,
            })
        }

        async fn positions(&self) -> Result<Vec<Position>> {
            if self.fail_snapshot {
                anyhow::bail!("positionRisk endpoint down");
            }
            Ok(self.positions.clone())
        }

        async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResult> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.orders.lock().unwrap().push(order.clone());
            Ok(OrderResult {
                order_id: Some("1".to_string()),
                symbol: order.symbol.clone(),
                side: order.side,
                quantity: order.quantity,
                simulated: false,
                timestamp: chrono::Utc::now(),
            })
        }
    }

    fn asset(symbol: &str, base_precision: u32, min_notional: Decimal) -> AssetInfo {
        AssetInfo {
            symbol: symbol.to_string(),
            base_precision,
            quote_precision: 8,
            min_notional,
        }
    }

    fn open_position(symbol: &str, amt: Decimal, mark: Decimal, profit: Decimal) -> Position {
        Position {
            symbol: symbol.to_string(),
            position_amt: amt,
            entry_price: mark,
            mark_price: mark,
            leverage: 20,
            unrealized_profit: profit,
        }
    }

    fn watchlist(symbols: &[&str]) -> TradingConfig {
        TradingConfig {
            watchlist: symbols.iter().map(ToString::to_string).collect(),
            ..TradingConfig::default()
        }
    }

    fn manager(api: Arc<StubExchange>, settings: TradingConfig) -> PositionManager {
        let gateway = Arc::new(LiveGateway::new(api.clone()));
        PositionManager::new(api, gateway, settings)
    }

    // ==================== Open Phase Tests ====================

    #[tokio::test]
    async fn test_opens_only_symbols_without_exposure() {
        let mut stub = StubExchange::new();
        stub.positions = vec![open_position("XRPUSDT", dec!(100), dec!(0.5), dec!(1))];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&["XRPUSDT", "DOGEUSDT"]))
            .run_once()
            .await
            .unwrap();

        let orders = api.recorded_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol, "DOGEUSDT");
        assert_eq!(orders[0].side, Side::Sell);
        assert_eq!(orders[0].leverage, 20);
        assert_eq!(report.opened.len(), 1);
    }

    #[tokio::test]
    async fn test_open_quantity_from_sizing_formula() {
        // balance 1000 -> risk 200; price 2.0 at precision 1 -> 100.0
        let mut stub = StubExchange::new();
        stub.assets = vec![asset("XRPUSDT", 1, dec!(5))];
        stub.prices = HashMap::from([("XRPUSDT".to_string(), dec!(2.0))]);
        let api = Arc::new(stub);

        manager(api.clone(), watchlist(&["XRPUSDT"]))
            .run_once()
            .await
            .unwrap();

        let orders = api.recorded_orders();
        assert_eq!(orders[0].quantity, dec!(100.0));
    }

    #[tokio::test]
    async fn test_open_phase_is_sequential_and_ordered() {
        let api = Arc::new(StubExchange::new());

        manager(api.clone(), watchlist(&["XRPUSDT", "DOGEUSDT", "ADAUSDT"]))
            .run_once()
            .await
            .unwrap();

        let symbols: Vec<String> = api
            .recorded_orders()
            .iter()
            .map(|o| o.symbol.clone())
            .collect();
        assert_eq!(symbols, ["XRPUSDT", "DOGEUSDT", "ADAUSDT"]);
        assert_eq!(
            api.max_in_flight.load(Ordering::SeqCst),
            1,
            "placements overlapped"
        );
    }

    #[tokio::test]
    async fn test_open_phase_isolates_per_symbol_failures() {
        let mut stub = StubExchange::new();
        stub.prices.remove("DOGEUSDT");
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&["DOGEUSDT", "XRPUSDT"]))
            .run_once()
            .await
            .unwrap();

        // DOGEUSDT fails on price lookup; XRPUSDT still opens.
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "DOGEUSDT");
        assert!(report.failures[0].error.contains("price unavailable"));
        let orders = api.recorded_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].symbol, "XRPUSDT");
    }

    #[tokio::test]
    async fn test_simulation_places_no_exchange_orders() {
        let api = Arc::new(StubExchange::new());
        let pm = PositionManager::with_default_gateway(
            api.clone(),
            watchlist(&["XRPUSDT"]), // simulation defaults on
        );

        let report = pm.run_once().await.unwrap();

        assert!(api.recorded_orders().is_empty());
        assert_eq!(report.opened.len(), 1);
        assert!(report.opened[0].simulated);
    }

    // ==================== Evaluate Phase Tests ====================

    #[tokio::test]
    async fn test_reversal_on_roe_breach_doubles_and_flips_long() {
        // Long: value 50, margin 2.5, profit -0.375 => ROE -15.
        // Normal size: risk 200 at price 0.5, precision 1 => 400.0.
        let mut stub = StubExchange::new();
        stub.positions = vec![open_position("XRPUSDT", dec!(100), dec!(0.5), dec!(-0.375))];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        let orders = api.recorded_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Sell);
        assert_eq!(orders[0].quantity, dec!(800.0));
        assert_eq!(report.reversals.len(), 1);
        assert_eq!(report.rows[0].roe, dec!(-15.00));
    }

    #[tokio::test]
    async fn test_reversal_of_short_buys() {
        // Short under water: value -40, margin -2, profit -0.5 => ROE -25.
        let mut stub = StubExchange::new();
        stub.positions = vec![open_position("DOGEUSDT", dec!(-400), dec!(0.1), dec!(-0.5))];
        let api = Arc::new(stub);

        manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        let orders = api.recorded_orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, Side::Buy);
    }

    #[tokio::test]
    async fn test_no_reversal_above_threshold() {
        // ROE -5: below water but above the -10 threshold.
        let mut stub = StubExchange::new();
        stub.positions = vec![open_position("XRPUSDT", dec!(100), dec!(0.5), dec!(-0.125))];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        assert!(api.recorded_orders().is_empty());
        assert!(report.reversals.is_empty());
        assert_eq!(report.rows[0].roe, dec!(-5.00));
    }

    #[tokio::test]
    async fn test_profitable_position_left_alone() {
        let mut stub = StubExchange::new();
        stub.positions = vec![open_position("XRPUSDT", dec!(-100), dec!(0.5), dec!(20))];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        assert!(report.reversals.is_empty());
        assert!(report.rows[0].roe > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_evaluate_phase_isolates_per_position_failures() {
        // First position violates the evaluator contract; the second must
        // still be evaluated and reversed.
        let mut stub = StubExchange::new();
        let mut bad = open_position("ADAUSDT", dec!(10), dec!(0.4), dec!(-1));
        bad.leverage = 0;
        stub.positions = vec![
            bad,
            open_position("XRPUSDT", dec!(100), dec!(0.5), dec!(-0.375)),
        ];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].symbol, "ADAUSDT");
        assert_eq!(report.reversals.len(), 1);
        assert_eq!(report.reversals[0].symbol, "XRPUSDT");
    }

    #[tokio::test]
    async fn test_rows_reported_for_every_open_position() {
        let mut stub = StubExchange::new();
        stub.positions = vec![
            open_position("XRPUSDT", dec!(100), dec!(0.5), dec!(1)),
            open_position("DOGEUSDT", dec!(-500), dec!(0.1), dec!(-0.1)),
            // Flat record from the exchange: filtered out of the snapshot.
            open_position("ADAUSDT", Decimal::ZERO, dec!(0.4), Decimal::ZERO),
        ];
        let api = Arc::new(stub);

        let report = manager(api.clone(), watchlist(&[])).run_once().await.unwrap();

        assert_eq!(report.rows.len(), 2);
        assert!(report.rows.iter().all(|r| r.symbol != "ADAUSDT"));
    }

    // ==================== Snapshot Tests ====================

    #[tokio::test]
    async fn test_snapshot_failure_aborts_run() {
        let mut stub = StubExchange::new();
        stub.fail_snapshot = true;
        let api = Arc::new(stub);

        let err = manager(api, watchlist(&["XRPUSDT"])).run_once().await.unwrap_err();
        assert!(matches!(err, RiskError::AccountQueryFailed(_)));
    }

    #[tokio::test]
    async fn test_run_ends_after_one_pass() {
        let api = Arc::new(StubExchange::new());
        let pm = manager(api.clone(), watchlist(&["XRPUSDT"]));

        pm.run_once().await.unwrap();
        assert_eq!(api.recorded_orders().len(), 1);

        // A second invocation starts from a fresh snapshot and, with the
        // stub still reporting no exposure, opens again.
        pm.run_once().await.unwrap();
        assert_eq!(api.recorded_orders().len(), 2);
    }
}

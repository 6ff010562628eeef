use std::time::Instant;

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::warn;

use portfolio_risk_core::series::{simple_returns, validate_price_series, PriceSeriesReport};

use super::{envelope, read_request, CommandResult, InputArgs};

#[derive(Debug, Serialize, Deserialize)]
pub struct ReturnsRequest {
    /// Price histories, one per asset
    pub prices: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct SeriesReturns {
    asset: usize,
    report: PriceSeriesReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    returns: Option<Vec<f64>>,
}

/// Arguments for price-to-return conversion
#[derive(Args)]
pub struct ReturnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn run_returns(args: ReturnsArgs) -> CommandResult {
    let started = Instant::now();
    let request: ReturnsRequest = read_request(&args.input, "returns")?;
    let mut warnings = Vec::new();
    let mut series = Vec::with_capacity(request.prices.len());
    for (asset, prices) in request.prices.iter().enumerate() {
        let report = validate_price_series(prices);
        let returns = if report.is_valid {
            Some(simple_returns(prices)?)
        } else {
            warn!(asset, issues = ?report.issues, "price series rejected");
            warnings.extend(report.issues.iter().map(|i| format!("asset {asset}: {i}")));
            None
        };
        series.push(SeriesReturns {
            asset,
            report,
            returns,
        });
    }
    envelope(
        "Simple returns with price-series quality screen",
        &serde_json::json!({ "assets": request.prices.len() }),
        warnings,
        started,
        series,
    )
}

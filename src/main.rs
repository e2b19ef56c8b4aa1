//! cardops-engine CLI
//!
//! Run the back-office engines from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Detect arbitrage in a rate file
//! cardops-engine arbitrage --input rates.json
//!
//! # Daily balances over a window
//! cardops-engine balances --input changes.json --from 2026-01-01 --to 2026-01-31
//!
//! # Allocate a payment across debt buckets
//! cardops-engine allocate --input portfolio.json --strategy bank_rule
//!
//! # Generate random inputs for testing
//! cardops-engine generate rates --pairs 12
//! ```

use cardops_engine::allocation::debt::{BucketId, DebtBucket, DebtType};
use cardops_engine::allocation::strategy::{
    strategy_for, AllocationStrategy, StrategyConfig, StrategyKind,
};
use cardops_engine::arbitrage::detector::ArbitrageDetector;
use cardops_engine::balance::bucket::{BalanceBucket, BucketAmounts};
use cardops_engine::balance::change::BalanceChange;
use cardops_engine::balance::sweep::SweepBalanceCalculator;
use cardops_engine::core::currency::{Currency, CurrencyPair};
use cardops_engine::core::dates::DateRange;
use cardops_engine::core::money::Money;
use cardops_engine::graph::rate_graph::CurrencyGraph;
use cardops_engine::simulation::scenario::{
    generate_portfolio, generate_rate_network, PortfolioConfig, RateNetworkConfig,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::process;
use uuid::Uuid;

fn print_usage() {
    eprintln!(
        r#"cardops-engine — credit-card back-office computation engines

USAGE:
    cardops-engine <COMMAND> [OPTIONS]

COMMANDS:
    arbitrage   Detect arbitrage cycles in an exchange-rate file
    balances    Compute daily and average balances over a date window
    allocate    Distribute a payment across debt buckets
    generate    Generate random inputs (for testing)
    help        Show this message

OPTIONS (arbitrage):
    --input <FILE>      Path to JSON rates file
    --source <CODE>     Only report the first cycle found from this currency
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (balances):
    --input <FILE>      Path to JSON changes file
    --from <DATE>       Window start (YYYY-MM-DD)
    --to <DATE>         Window end (YYYY-MM-DD)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (allocate):
    --input <FILE>      Path to JSON portfolio file
    --strategy <KIND>   bank_rule | optimal | greedy | manual
    --granularity <N>   Discretisation step for the optimal strategy
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    rates --pairs <N>       Random rate network
    portfolio --buckets <N> Random debt portfolio
    --output <FILE>         Write to file instead of stdout

EXAMPLES:
    cardops-engine arbitrage --input rates.json --format json
    cardops-engine balances --input changes.json --from 2026-01-01 --to 2026-01-12
    cardops-engine allocate --input portfolio.json --strategy greedy
    cardops-engine generate portfolio --buckets 6 --output portfolio.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

// --- input schemas ---

#[derive(serde::Deserialize)]
struct RateInput {
    from: String,
    to: String,
    rate: Decimal,
}

#[derive(serde::Deserialize)]
struct RatesFile {
    rates: Vec<RateInput>,
}

#[derive(serde::Deserialize)]
struct ChangeInput {
    date: NaiveDate,
    bucket: String,
    amount: Decimal,
}

#[derive(serde::Deserialize)]
struct ChangesFile {
    #[serde(default)]
    initial: BTreeMap<String, Decimal>,
    changes: Vec<ChangeInput>,
}

#[derive(serde::Deserialize)]
struct PortfolioBucketInput {
    id: String,
    #[serde(rename = "type")]
    debt_type: String,
    balance: Decimal,
    minimum_payment: Decimal,
    annual_rate: Decimal,
    due_date: NaiveDate,
}

#[derive(serde::Deserialize)]
struct PortfolioFile {
    payment: Decimal,
    #[serde(default = "default_currency")]
    currency: String,
    buckets: Vec<PortfolioBucketInput>,
    #[serde(default)]
    plan: BTreeMap<String, Decimal>,
}

fn default_currency() -> String {
    "TRY".to_string()
}

// --- output schemas ---

#[derive(serde::Serialize)]
struct OpportunityOutput {
    path: Vec<String>,
    total_rate: String,
    profit_percent: String,
}

#[derive(serde::Serialize)]
struct DailyBalanceOutput {
    date: String,
    balances: BTreeMap<String, String>,
    total: String,
}

#[derive(serde::Serialize)]
struct AllocationOutput {
    allocation_id: String,
    strategy: String,
    payment: String,
    allocated_total: String,
    unallocated: String,
    amounts: BTreeMap<String, String>,
}

// --- option parsing ---

struct Options {
    values: BTreeMap<String, String>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Options {
    let mut values = BTreeMap::new();
    let mut positional = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(name) = arg.strip_prefix("--") {
            i += 1;
            let value = args.get(i).cloned().unwrap_or_else(|| {
                fail(format!("--{name} requires a value"));
            });
            values.insert(name.to_string(), value);
        } else {
            positional.push(arg.clone());
        }
        i += 1;
    }
    Options { values, positional }
}

impl Options {
    fn require(&self, name: &str) -> &str {
        self.values
            .get(name)
            .unwrap_or_else(|| fail(format!("--{name} <VALUE> is required")))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn format(&self) -> &str {
        self.get("format").unwrap_or("text")
    }
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("reading '{path}': {e}")))
}

fn parse_currency(code: &str) -> Currency {
    code.parse().unwrap_or_else(|e| fail(e))
}

fn parse_bucket(label: &str) -> BalanceBucket {
    label.parse().unwrap_or_else(|e| fail(e))
}

fn parse_date(value: &str) -> NaiveDate {
    value
        .parse()
        .unwrap_or_else(|e| fail(format!("invalid date '{value}': {e}")))
}

// --- commands ---

fn load_graph(path: &str) -> CurrencyGraph {
    let file: RatesFile = serde_json::from_str(&read_file(path)).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {e}");
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "rates": [
    {{ "from": "USD", "to": "EUR", "rate": "0.9" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut graph = CurrencyGraph::new();
    for rate in file.rates {
        let pair = CurrencyPair::observed_now(
            parse_currency(&rate.from),
            parse_currency(&rate.to),
            rate.rate,
        )
        .unwrap_or_else(|e| fail(e));
        graph.add_pair(pair);
    }
    graph
}

fn cmd_arbitrage(args: &[String]) {
    let options = parse_options(args);
    let graph = load_graph(options.require("input"));
    let detector = ArbitrageDetector::with_defaults();

    let opportunities = match options.get("source") {
        Some(code) => {
            let source = parse_currency(code);
            match detector.detect_from(&graph, source) {
                Ok(found) => found.into_iter().collect(),
                Err(e) => fail(e),
            }
        }
        None => detector.detect(&graph).unwrap_or_else(|e| fail(e)),
    };

    if options.format() == "json" {
        let output: Vec<OpportunityOutput> = opportunities
            .iter()
            .map(|o| OpportunityOutput {
                path: o.cycle().iter().map(|c| c.to_string()).collect(),
                total_rate: o.total_rate().to_string(),
                profit_percent: o.profit_percent().to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else if opportunities.is_empty() {
        println!("No arbitrage opportunities detected.");
        println!("{}", detector.statistics(&graph));
    } else {
        for (i, opportunity) in opportunities.iter().enumerate() {
            println!("Opportunity {}: {}", i + 1, opportunity);
        }
        println!();
        println!("{}", detector.statistics(&graph));
    }
}

fn cmd_balances(args: &[String]) {
    let options = parse_options(args);
    let file: ChangesFile = serde_json::from_str(&read_file(options.require("input")))
        .unwrap_or_else(|e| fail(format!("parsing JSON: {e}")));

    let mut initial = BucketAmounts::new();
    for (label, amount) in &file.initial {
        initial.set(parse_bucket(label), *amount);
    }

    let mut calculator = SweepBalanceCalculator::with_initial(initial);
    for change in &file.changes {
        calculator.add_change(
            &BalanceChange::new(change.date, change.amount),
            parse_bucket(&change.bucket),
        );
    }

    let range = DateRange::new(
        parse_date(options.require("from")),
        parse_date(options.require("to")),
    )
    .unwrap_or_else(|e| fail(e));

    let snapshots = calculator.daily_balances(&range);
    let averages = calculator.average_balances(&range);

    if options.format() == "json" {
        let output: Vec<DailyBalanceOutput> = snapshots
            .iter()
            .map(|snapshot| DailyBalanceOutput {
                date: snapshot.date().to_string(),
                balances: snapshot
                    .amounts()
                    .iter()
                    .map(|(bucket, amount)| (bucket.to_string(), amount.to_string()))
                    .collect(),
                total: snapshot.total_balance().to_string(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for snapshot in &snapshots {
            println!("{snapshot}");
        }
        println!("\nAverages over {range}:");
        for (bucket, amount) in averages.iter() {
            println!("  {bucket}: {amount}");
        }
    }
}

fn cmd_allocate(args: &[String]) {
    let options = parse_options(args);
    let file: PortfolioFile = serde_json::from_str(&read_file(options.require("input")))
        .unwrap_or_else(|e| fail(format!("parsing JSON: {e}")));

    let currency = parse_currency(&file.currency);
    let buckets: Vec<DebtBucket> = file
        .buckets
        .iter()
        .map(|b| {
            let debt_type: DebtType = b.debt_type.parse().unwrap_or_else(|e| fail(e));
            DebtBucket::new(
                BucketId::new(&b.id),
                debt_type,
                Money::new(b.balance, currency),
                Money::new(b.minimum_payment, currency),
                b.annual_rate,
                b.due_date,
            )
        })
        .collect();

    let kind: StrategyKind = options
        .get("strategy")
        .unwrap_or("bank_rule")
        .parse()
        .unwrap_or_else(|e| fail(e));

    let mut config = StrategyConfig::default();
    if let Some(granularity) = options.get("granularity") {
        config.granularity = Some(
            granularity
                .parse()
                .unwrap_or_else(|e| fail(format!("invalid granularity: {e}"))),
        );
    }
    if !file.plan.is_empty() {
        config.manual_plan = Some(
            file.plan
                .iter()
                .map(|(id, amount)| (BucketId::new(id), *amount))
                .collect(),
        );
    }

    let strategy = strategy_for(kind, config);
    let payment = Money::new(file.payment, currency);

    if !strategy.is_applicable(&buckets, &payment) {
        fail(format!("strategy {kind} is not applicable to this portfolio"));
    }

    let allocation = strategy
        .allocate(&buckets, payment, Uuid::new_v4())
        .unwrap_or_else(|e| fail(e));

    if options.format() == "json" {
        let output = AllocationOutput {
            allocation_id: allocation.id().to_string(),
            strategy: allocation.strategy().to_string(),
            payment: allocation.total_payment().to_string(),
            allocated_total: allocation.allocated_total().to_string(),
            unallocated: allocation.unallocated().to_string(),
            amounts: allocation
                .amounts()
                .iter()
                .map(|(id, amount)| (id.to_string(), amount.amount().to_string()))
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{allocation}");
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(args);
    let target = options
        .positional
        .first()
        .map(String::as_str)
        .unwrap_or("rates");

    let json = match target {
        "rates" => {
            let config = RateNetworkConfig {
                pair_count: options
                    .get("pairs")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(12),
                ..Default::default()
            };
            let graph = generate_rate_network(&config);

            #[derive(serde::Serialize)]
            struct RateOutput {
                from: String,
                to: String,
                rate: String,
            }
            #[derive(serde::Serialize)]
            struct RatesOutput {
                rates: Vec<RateOutput>,
            }

            let rates = graph
                .all_edges()
                .into_iter()
                .map(|edge| RateOutput {
                    from: edge.from.to_string(),
                    to: edge.to.to_string(),
                    rate: edge.pair.rate().to_string(),
                })
                .collect();
            serde_json::to_string_pretty(&RatesOutput { rates }).unwrap()
        }
        "portfolio" => {
            let config = PortfolioConfig {
                bucket_count: options
                    .get("buckets")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                ..Default::default()
            };
            let portfolio = generate_portfolio(&config);

            #[derive(serde::Serialize)]
            struct BucketOutput {
                id: String,
                #[serde(rename = "type")]
                debt_type: String,
                balance: String,
                minimum_payment: String,
                annual_rate: String,
                due_date: String,
            }
            #[derive(serde::Serialize)]
            struct PortfolioOutput {
                payment: String,
                currency: String,
                buckets: Vec<BucketOutput>,
            }

            let total: Decimal = portfolio.iter().map(|b| b.balance().amount()).sum();
            let output = PortfolioOutput {
                payment: (total / Decimal::from(2)).round_dp(2).to_string(),
                currency: config.currency.to_string(),
                buckets: portfolio
                    .iter()
                    .map(|b| BucketOutput {
                        id: b.id().to_string(),
                        debt_type: b.debt_type().to_string(),
                        balance: b.balance().amount().to_string(),
                        minimum_payment: b.minimum_payment().amount().to_string(),
                        annual_rate: b.annual_rate().to_string(),
                        due_date: b.due_date().to_string(),
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&output).unwrap()
        }
        other => fail(format!("unknown generate target: {other}")),
    };

    match options.get("output") {
        Some(path) => {
            fs::write(path, &json).unwrap_or_else(|e| fail(format!("writing '{path}': {e}")));
            eprintln!("Wrote {target} to {path}");
        }
        None => println!("{json}"),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "arbitrage" => cmd_arbitrage(rest),
        "balances" => cmd_balances(rest),
        "allocate" => cmd_allocate(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage();
            process::exit(1);
        }
    }
}

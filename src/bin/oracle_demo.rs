//! Demo: score one sample fight with both formulas, then ask the configured advisor.
//!
//! Usage: `oracle_demo [boss1 boss2 boss3]`

use card_oracle::advisor::build_advisor_default;
use card_oracle::predict::{predict_local, predict_with_advisor};
use card_oracle::{BossSelection, CombatWindow, Strategy};
use chrono::Local;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    card_oracle::telemetry::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let bosses = match args.as_slice() {
        [a, b, c] => BossSelection::new(a.as_str(), b.as_str(), c.as_str()),
        _ => BossSelection::new("Alpha", "Beta", "Gamma"),
    };

    let now = Local::now().naive_local();
    let window = CombatWindow::default_ending_at(now);

    for strategy in [Strategy::Basic, Strategy::Enhanced] {
        let p = predict_local(strategy, &window, &bosses, now);
        println!(
            "[{:?}] card {} ({:.1}%)\n{}\n",
            strategy,
            p.recommendation.chosen_position,
            p.recommendation.probability,
            p.recommendation.rationale
        );
    }

    let advisor = build_advisor_default();
    let p = predict_with_advisor(advisor.as_ref(), &window, &bosses, now).await;
    println!(
        "[advisor:{} {}] card {}\n{}",
        advisor.name(),
        p.remote.reason(),
        p.recommendation.chosen_position,
        p.recommendation.rationale
    );

    println!("oracle-demo done");
}

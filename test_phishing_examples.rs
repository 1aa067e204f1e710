use phish_scorer::config::ScoringWeights;
use phish_scorer::detector::{DetectOptions, PhishingDetector};
use phish_scorer::predictor::from_fn;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let samples = [
        (
            "IP-literal credential lure",
            "URGENT: verify your password now at http://192.168.1.5/login!!! Your account will be suspended.",
        ),
        ("Team note", "Hi team, lunch moved to 1pm tomorrow."),
        (
            "Prize notice",
            "<p>CONGRATULATIONS WINNER!!</p><p>Click www.claim-prize.top/now to confirm your billing details</p>",
        ),
        (
            "Invoice reminder",
            "Hello, please find attached invoice 2231.pdf for last month. Regards, Accounts",
        ),
    ];

    let detector = PhishingDetector::default();
    let weights = ScoringWeights::default();

    println!("Heuristic verdicts (threshold {}):", detector.threshold());
    for (name, text) in &samples {
        let verdict = detector.detect(Some(*text), &DetectOptions::default()).await;
        println!();
        println!("📧 {name}");
        println!(
            "   {:?} at {:.4}",
            verdict.label, verdict.probability
        );
        for (feature, value) in verdict.contributions(&weights) {
            if value != 0.0 {
                println!("   {:<14} {:+.4}", feature, value);
            }
        }
    }

    println!();
    println!("With an external model that always fails:");
    detector.set_external_predictor(Arc::new(from_fn(|_text: String| async {
        Err::<f64, anyhow::Error>(anyhow::anyhow!("model offline"))
    })));
    let options = DetectOptions::default().with_external_model();
    for (name, text) in &samples {
        let verdict = detector.detect(Some(*text), &options).await;
        println!(
            "   {name}: {:?} at {:.4} ({:?})",
            verdict.label, verdict.probability, verdict.source
        );
    }

    Ok(())
}

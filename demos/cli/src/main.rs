use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use maternal_care::MaternalCare;
use maternal_core::{display_time, CareConfig, MetricsInput, ProfileInput, ProviderInput};
use serde::Deserialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "maternal-cli",
    about = "Chạy kịch bản hồ sơ thai sản và in các cảnh báo nguy cơ."
)]
struct Args {
    /// Đường dẫn tới file JSON kịch bản.
    #[arg(short, long)]
    input: PathBuf,

    /// File JSON cấu hình ngưỡng (tùy chọn).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ghi snapshot store ra file sau khi chạy.
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

/// Bản ghi trong kịch bản tham chiếu nhau bằng bí danh thay cho id sinh tự động.
#[derive(Deserialize, Debug)]
struct Scenario {
    #[serde(default)]
    providers: Vec<ScenarioProvider>,
    #[serde(default)]
    profiles: Vec<ScenarioProfile>,
    #[serde(default)]
    readings: Vec<ScenarioReading>,
}

#[derive(Deserialize, Debug)]
struct ScenarioProvider {
    alias: String,
    #[serde(flatten)]
    input: ProviderInput,
}

#[derive(Deserialize, Debug)]
struct ScenarioProfile {
    alias: String,
    provider: String,
    #[serde(flatten)]
    input: ProfileInput,
}

#[derive(Deserialize, Debug)]
struct ScenarioReading {
    profile: String,
    provider: String,
    #[serde(flatten)]
    input: MetricsInput,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Không đọc được file {:?}", path))?;
            serde_json::from_str::<CareConfig>(&data)
                .with_context(|| format!("Cấu hình không hợp lệ {:?}", path))?
        }
        None => CareConfig::default(),
    };

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;
    let scenario: Scenario = serde_json::from_str(&data)
        .with_context(|| format!("Kịch bản không hợp lệ {:?}", args.input))?;

    let mut care = MaternalCare::new(config);
    let mut providers = HashMap::new();
    let mut profiles = HashMap::new();

    for entry in scenario.providers {
        let provider = care
            .register_provider(entry.input)
            .with_context(|| format!("Provider {}", entry.alias))?;
        providers.insert(entry.alias, provider.id);
    }

    for entry in scenario.profiles {
        let mut input = entry.input;
        input.primary_care_provider_id = lookup(&providers, &entry.provider)?;
        let profile = care
            .create_profile(input)
            .with_context(|| format!("Profile {}", entry.alias))?;
        profiles.insert(entry.alias, profile.id);
    }

    let mut rejected = 0;
    for entry in scenario.readings {
        let mut input = entry.input;
        input.maternal_profile_id = lookup(&profiles, &entry.profile)?;
        input.recorded_by = lookup(&providers, &entry.provider)?;
        if let Err(err) = care.record_metrics(input) {
            warn!(profile = %entry.profile, %err, "reading rejected");
            rejected += 1;
        }
    }

    let store = care.store();
    println!(
        "Profiles: {}\nReadings: {} ({} rejected)\nAlerts: {}",
        store.profiles.len(),
        store.metrics.len(),
        rejected,
        store.alerts.len()
    );

    for alert in care.open_alerts() {
        let profile_name = care
            .profile(&alert.maternal_profile_id)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        println!(
            "[{:?} L{}] {} | {} | {}",
            alert.severity,
            alert.escalation_level,
            display_time(alert.created_at)?,
            profile_name,
            alert.description
        );
    }

    if let Some(path) = &args.snapshot {
        std::fs::write(path, care.snapshot()?)
            .with_context(|| format!("Không ghi được file {:?}", path))?;
    }

    Ok(())
}

fn lookup(aliases: &HashMap<String, String>, alias: &str) -> anyhow::Result<String> {
    aliases
        .get(alias)
        .cloned()
        .ok_or_else(|| anyhow!("Không tìm thấy bí danh {alias}"))
}

// ==========================================
// 校园碳足迹核算系统 - 命令行入口
// ==========================================
// 结果以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use std::str::FromStr;

use anyhow::Context;
use carbonwise::api::dto::{
    GetCarbonFootprintByPeriodRequest, GetCarbonFootprintByYearRequest, GetDashboardRequest,
    GetYearComparisonRequest,
};
use carbonwise::app::{get_default_db_path, AppState};
use carbonwise::{logging, EmissionCategory, FactorOverrides};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "carbonwise", version)]
#[command(about = "校园碳足迹核算: 电力与校园交通排放")]
struct Cli {
    /// SQLite 数据库路径（缺省为用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 覆写排放因子，可重复: electricity|shuttle_bus|car|motorcycle=VALUE
    #[arg(long = "factor", global = true, value_name = "CATEGORY=VALUE", value_parser = parse_factor, action = ArgAction::Append)]
    factors: Vec<(EmissionCategory, Decimal)>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 单年碳足迹
    Year {
        year: i32,
    },
    /// 区间碳足迹（日期 YYYY-MM-DD）
    Period {
        #[arg(value_parser = parse_date_arg)]
        start: NaiveDate,
        #[arg(value_parser = parse_date_arg)]
        end: NaiveDate,
    },
    /// 当年与上一年对比
    Compare,
    /// 驾驶舱摘要
    Dashboard,
    /// 导入电表读数（.xlsx/.xls/.csv）
    Import {
        file: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let overrides = factor_overrides(&cli.factors);
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{}，数据库: {}", carbonwise::APP_NAME, carbonwise::VERSION, db_path);
    let state = AppState::new(db_path)
        .map_err(anyhow::Error::msg)
        .context("初始化应用状态失败")?;

    match cli.command {
        Commands::Year { year } => {
            let request = GetCarbonFootprintByYearRequest {
                year,
                emission_factors: overrides,
            };
            print_json(&state.carbon_footprint_api.get_by_year(&request).await?)?;
        }
        Commands::Period { start, end } => {
            let request = GetCarbonFootprintByPeriodRequest {
                start_date: start,
                end_date: end,
                emission_factors: overrides,
            };
            print_json(&state.carbon_footprint_api.get_by_period(&request).await?)?;
        }
        Commands::Compare => {
            let request = GetYearComparisonRequest {
                emission_factors: overrides,
            };
            print_json(&state.carbon_footprint_api.get_year_comparison(&request).await?)?;
        }
        Commands::Dashboard => {
            let request = GetDashboardRequest {
                emission_factors: overrides,
            };
            print_json(&state.carbon_footprint_api.get_dashboard(&request).await?)?;
        }
        Commands::Import { file } => {
            print_json(&state.import_api.import_electricity(&file).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("日期格式错误 (期望 YYYY-MM-DD): {} ({})", raw, e))
}

fn parse_factor(raw: &str) -> Result<(EmissionCategory, Decimal), String> {
    let (category, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("排放因子格式错误 (期望 CATEGORY=VALUE): {}", raw))?;

    let category_name = category.trim().to_lowercase();
    let category = EmissionCategory::ALL
        .into_iter()
        .find(|c| c.key_suffix() == category_name)
        .ok_or_else(|| format!("未知排放类别: {}", category.trim()))?;
    let value = Decimal::from_str(value.trim())
        .map_err(|e| format!("排放因子数值错误: {} ({})", value.trim(), e))?;

    Ok((category, value))
}

// 同一类别重复出现时后者生效
fn factor_overrides(factors: &[(EmissionCategory, Decimal)]) -> FactorOverrides {
    let mut overrides = FactorOverrides::default();
    for (category, value) in factors {
        let slot = match category {
            EmissionCategory::Electricity => &mut overrides.electricity,
            EmissionCategory::ShuttleBus => &mut overrides.shuttle_bus,
            EmissionCategory::Car => &mut overrides.car,
            EmissionCategory::Motorcycle => &mut overrides.motorcycle,
        };
        *slot = Some(*value);
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_factor() {
        assert_eq!(
            parse_factor("Electricity=0.5"),
            Ok((EmissionCategory::Electricity, Decimal::from_str("0.5").unwrap()))
        );
        assert_eq!(
            parse_factor(" shuttle_bus = 0.03 "),
            Ok((EmissionCategory::ShuttleBus, Decimal::from_str("0.03").unwrap()))
        );
        assert!(parse_factor("electricity").is_err());
        assert!(parse_factor("bicycle=1").is_err());
        assert!(parse_factor("car=abc").is_err());
    }

    #[test]
    fn test_global_flags_and_repeated_factors() {
        let cli = Cli::try_parse_from([
            "carbonwise",
            "year",
            "2024",
            "--db",
            "/tmp/carbon.db",
            "--factor",
            "car=0.05",
            "--factor",
            "car=0.07",
            "--factor",
            "motorcycle=0.02",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some("/tmp/carbon.db"));
        assert!(cli.log_json);
        assert!(matches!(cli.command, Commands::Year { year: 2024 }));

        let overrides = factor_overrides(&cli.factors);
        assert_eq!(overrides.car, Some(Decimal::from_str("0.07").unwrap()));
        assert_eq!(overrides.motorcycle, Some(Decimal::from_str("0.02").unwrap()));
        assert_eq!(overrides.electricity, None);
    }

    #[test]
    fn test_period_dates_are_validated() {
        let cli = Cli::try_parse_from(["carbonwise", "period", "2024-01-01", "2024-06-30"]).unwrap();
        match cli.command {
            Commands::Period { start, end } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
            }
            _ => panic!("expected period command"),
        }

        assert!(Cli::try_parse_from(["carbonwise", "period", "01/01/2024", "2024-06-30"]).is_err());
        assert!(Cli::try_parse_from(["carbonwise", "--factor", "gas=1", "compare"]).is_err());
        assert!(Cli::try_parse_from(["carbonwise"]).is_err());
    }
}

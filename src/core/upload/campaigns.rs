// NewCampaigns rows → campaign budget + Performance Max campaign.

use super::asset_fetcher::AssetFetcher;
use super::upload_models::{ResultColumns, RowResult, RowResults, StepReport, UploadError};
use super::upload_service::{ListSnapshot, UploadService};
use crate::core::accounts::CreatedEntity;
use crate::core::ads::ads_models::{
    Campaign, CampaignBudget, MaximizeConversionValue, MaximizeConversions, Operation,
};
use crate::core::ads::{resources, AdsApi, MutateOperation, TempIdAllocator};
use crate::core::sheets::sheet_models::new_campaigns as cols;
use crate::core::sheets::sheet_rows::{cell, non_blank};
use crate::core::sheets::{Row, RowStatus, SheetName, SheetsApi};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

const RESULT_COLUMNS: ResultColumns = ResultColumns {
    status: cols::STATUS,
    message: cols::MESSAGE,
    resource: None,
};

const DEFAULT_DELIVERY_METHOD: &str = "STANDARD";
const DEFAULT_CAMPAIGN_STATUS: &str = "PAUSED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BiddingStrategy {
    MaximizeConversions,
    MaximizeConversionValue,
}

fn parse_bidding_strategy(value: &str) -> Result<BiddingStrategy, String> {
    let normalized: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match normalized.as_str() {
        "" | "maximizeconversions" => Ok(BiddingStrategy::MaximizeConversions),
        "maximizeconversionvalue" => Ok(BiddingStrategy::MaximizeConversionValue),
        _ => Err(format!("Unknown bidding strategy: {}", value.trim())),
    }
}

/// `1,234.5` style grouping; any other comma is rejected rather than guessed.
fn grouped_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$")
            .unwrap_or_else(|e| panic!("invalid number pattern: {}", e))
    })
}

fn parse_number(row: &[String], column: usize, label: &str) -> Result<Option<f64>, String> {
    let Some(value) = non_blank(row, column) else {
        return Ok(None);
    };
    let invalid = || format!("Invalid {}: {}", label, value);
    let plain = if value.contains(',') {
        if !grouped_number_pattern().is_match(value) {
            return Err(invalid());
        }
        value.replace(',', "")
    } else {
        value.to_string()
    };
    match plain.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(invalid()),
    }
}

fn to_micros(amount: f64) -> i64 {
    (amount * 1_000_000.0).round() as i64
}

/// `2024-03-01` → `20240301`.
fn ads_date(row: &[String], column: usize, label: &str) -> Result<Option<String>, String> {
    match non_blank(row, column) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| Some(date.format("%Y%m%d").to_string()))
            .map_err(|_| format!("Invalid {}: {} (expected YYYY-MM-DD)", label, value)),
    }
}

fn campaign_status(row: &[String]) -> Result<String, String> {
    match non_blank(row, cols::CAMPAIGN_STATUS) {
        None => Ok(DEFAULT_CAMPAIGN_STATUS.to_string()),
        Some(value) => {
            let upper = value.to_ascii_uppercase();
            match upper.as_str() {
                "ENABLED" | "PAUSED" => Ok(upper),
                _ => Err(format!("Invalid campaign status: {}", value)),
            }
        }
    }
}

/// Budget and campaign operations for one row. The budget gets the first
/// temporary id so the campaign can reference it.
pub fn campaign_operations(customer_id: &str, row: &[String]) -> Result<Vec<MutateOperation>, String> {
    let name = non_blank(row, cols::CAMPAIGN_NAME).ok_or("Campaign name is required")?;
    let budget = parse_number(row, cols::BUDGET, "budget")?.ok_or("Budget is required")?;
    if budget <= 0.0 {
        return Err(format!("Budget must be positive: {}", budget));
    }
    let delivery_method = non_blank(row, cols::BUDGET_DELIVERY_METHOD)
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| DEFAULT_DELIVERY_METHOD.to_string());
    let status = campaign_status(row)?;

    let (maximize_conversions, maximize_conversion_value) =
        match parse_bidding_strategy(cell(row, cols::BIDDING_STRATEGY))? {
            BiddingStrategy::MaximizeConversions => {
                let target_cpa = parse_number(row, cols::TARGET_CPA, "target CPA")?;
                (
                    Some(MaximizeConversions {
                        target_cpa_micros: target_cpa.map(to_micros),
                    }),
                    None,
                )
            }
            BiddingStrategy::MaximizeConversionValue => {
                let target_roas = parse_number(row, cols::TARGET_ROAS, "target ROAS")?;
                (None, Some(MaximizeConversionValue { target_roas }))
            }
        };

    let start_date = ads_date(row, cols::START_DATE, "start date")?;
    let end_date = ads_date(row, cols::END_DATE, "end date")?;

    let mut ids = TempIdAllocator::new();
    let budget_resource = resources::campaign_budget(customer_id, ids.next_id());
    let campaign_resource = resources::campaign(customer_id, ids.next_id());

    Ok(vec![
        MutateOperation::CampaignBudgetOperation(Operation::Create(CampaignBudget {
            resource_name: budget_resource.clone(),
            name: format!("Performance Max campaign budget {}", name),
            amount_micros: to_micros(budget),
            delivery_method,
            explicitly_shared: false,
        })),
        MutateOperation::CampaignOperation(Operation::Create(Campaign {
            resource_name: campaign_resource,
            name: name.to_string(),
            advertising_channel_type: "PERFORMANCE_MAX".to_string(),
            status,
            campaign_budget: budget_resource,
            maximize_conversions,
            maximize_conversion_value,
            start_date,
            end_date,
            url_expansion_opt_out: false,
        })),
    ])
}

impl<S, A, F> UploadService<S, A, F>
where
    S: SheetsApi + ?Sized,
    A: AdsApi + ?Sized,
    F: AssetFetcher + ?Sized,
{
    pub(super) async fn upload_campaigns(
        &self,
        lists: &ListSnapshot,
        created: &mut Vec<CreatedEntity>,
    ) -> Result<StepReport, UploadError> {
        let rows = self.read_rows(SheetName::NewCampaigns).await?;
        let mut results = RowResults::new();
        let mut list_rows: Vec<Row> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            if RowStatus::is_uploaded(cell(row, cols::STATUS)) {
                continue;
            }
            let Some(campaign_name) = non_blank(row, cols::CAMPAIGN_NAME) else {
                continue;
            };
            let customer_name = cell(row, cols::CUSTOMER_NAME).trim();

            let Some(customer_id) = lists.customer_id(customer_name) else {
                results.insert(
                    index,
                    RowResult::error(format!("Customer \"{}\" not found in CustomerList", customer_name)),
                );
                continue;
            };
            let operations = match campaign_operations(&customer_id, row) {
                Ok(operations) => operations,
                Err(message) => {
                    results.insert(index, RowResult::error(message));
                    continue;
                }
            };

            match self.ads.mutate(&customer_id, &operations, false).await {
                Ok(response) => {
                    let campaign_id = response
                        .resource_name(1)
                        .map(resources::trailing_id)
                        .unwrap_or_default()
                        .to_string();
                    tracing::info!(customer_id = %customer_id, campaign_id = %campaign_id, "Created campaign {}", campaign_name);
                    list_rows.push(vec![
                        customer_name.to_string(),
                        customer_id.clone(),
                        campaign_name.to_string(),
                        campaign_id,
                    ]);
                    created.push(CreatedEntity::Campaign {
                        customer: customer_name.to_string(),
                        campaign: campaign_name.to_string(),
                    });
                    results.insert(index, RowResult::uploaded(None));
                }
                Err(e) => {
                    tracing::warn!(customer_id = %customer_id, "Campaign {} failed: {}", campaign_name, e);
                    results.insert(index, RowResult::error(e.to_string()));
                }
            }
        }

        self.write_results(SheetName::NewCampaigns, RESULT_COLUMNS, &results, Vec::new())
            .await?;
        self.append_list_rows(SheetName::Campaigns, list_rows).await?;
        Ok(StepReport::from_results(&results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ads::testing::{FakeAds, Scripted};
    use crate::core::ads::AdsError;
    use crate::core::sheets::testing::{row, FakeSheets};
    use crate::core::upload::testing::FakeFetcher;
    use std::sync::Arc;

    #[test]
    fn test_operations_for_value_bidding() {
        let values = row(&[
            "", "Acme", "Summer", "20", "accelerated", "enabled", "MaximizeConversionValue",
            "3.5", "", "2024-03-01", "2024-04-30",
        ]);
        let operations = campaign_operations("111", &values).unwrap();
        let MutateOperation::CampaignBudgetOperation(Operation::Create(budget)) = &operations[0] else {
            panic!("expected budget create");
        };
        assert_eq!(budget.amount_micros, 20_000_000);
        assert_eq!(budget.delivery_method, "ACCELERATED");
        assert_eq!(budget.resource_name, "customers/111/campaignBudgets/-1");
        assert_eq!(budget.name, "Performance Max campaign budget Summer");

        let MutateOperation::CampaignOperation(Operation::Create(campaign)) = &operations[1] else {
            panic!("expected campaign create");
        };
        assert_eq!(campaign.resource_name, "customers/111/campaigns/-2");
        assert_eq!(campaign.campaign_budget, budget.resource_name);
        assert_eq!(campaign.status, "ENABLED");
        assert_eq!(campaign.maximize_conversion_value.as_ref().and_then(|b| b.target_roas), Some(3.5));
        assert!(campaign.maximize_conversions.is_none());
        assert_eq!(campaign.start_date.as_deref(), Some("20240301"));
        assert_eq!(campaign.end_date.as_deref(), Some("20240430"));
    }

    #[test]
    fn test_operations_defaults_and_cpa() {
        let values = row(&["", "Acme", "Summer", "0.5", "", "", "", "", "1.25"]);
        let operations = campaign_operations("111", &values).unwrap();
        let MutateOperation::CampaignOperation(Operation::Create(campaign)) = &operations[1] else {
            panic!("expected campaign create");
        };
        assert_eq!(campaign.status, "PAUSED");
        assert_eq!(
            campaign.maximize_conversions,
            Some(MaximizeConversions {
                target_cpa_micros: Some(1_250_000)
            })
        );
        assert_eq!(campaign.start_date, None);
    }

    #[test]
    fn test_grouped_budget_is_accepted() {
        let values = row(&["", "Acme", "Summer", "1,234.50"]);
        let operations = campaign_operations("111", &values).unwrap();
        let MutateOperation::CampaignBudgetOperation(Operation::Create(budget)) = &operations[0] else {
            panic!("expected budget create");
        };
        assert_eq!(budget.amount_micros, 1_234_500_000);
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        let bad_date = row(&["", "Acme", "Summer", "10", "", "", "", "", "", "03/01/2024"]);
        assert!(campaign_operations("1", &bad_date).unwrap_err().contains("start date"));

        let bad_budget = row(&["", "Acme", "Summer", "ten"]);
        assert_eq!(campaign_operations("1", &bad_budget).unwrap_err(), "Invalid budget: ten");

        for budget in ["12,5", "1,2345", "NaN", "inf", "-infinity"] {
            let values = row(&["", "Acme", "Summer", budget]);
            assert_eq!(
                campaign_operations("1", &values).unwrap_err(),
                format!("Invalid budget: {}", budget)
            );
        }

        let bad_cpa = row(&["", "Acme", "Summer", "10", "", "", "", "", "1,5"]);
        assert_eq!(campaign_operations("1", &bad_cpa).unwrap_err(), "Invalid target CPA: 1,5");

        let bad_strategy = row(&["", "Acme", "Summer", "10", "", "", "TargetSpend"]);
        assert_eq!(
            campaign_operations("1", &bad_strategy).unwrap_err(),
            "Unknown bidding strategy: TargetSpend"
        );

        let bad_status = row(&["", "Acme", "Summer", "10", "", "LIVE"]);
        assert!(campaign_operations("1", &bad_status).is_err());
    }

    #[tokio::test]
    async fn test_upload_writes_status_and_skips_uploaded_rows() {
        let sheets = Arc::new(
            FakeSheets::new()
                .with_rows(SheetName::Customers, vec![row(&["Acme", "111"])])
                .with_rows(
                    SheetName::NewCampaigns,
                    vec![
                        row(&["UPLOADED", "Acme", "Old", "10"]),
                        row(&["", "Acme", "Summer", "10"]),
                        row(&["", "Globex", "Winter", "10"]),
                        row(&["", "Acme", "Broken", "10"]),
                    ],
                ),
        );
        let ads = Arc::new(FakeAds::new());
        let summer = campaign_operations("111", &row(&["", "Acme", "Summer", "10"])).unwrap();
        ads.script(Scripted::Response(ads.success_for("111", &summer)));
        ads.script(Scripted::Error(AdsError::Failure {
            request_id: "req".to_string(),
            errors: vec!["Duplicate campaign name.".to_string()],
        }));
        let service = UploadService::new(sheets.clone(), ads.clone(), Arc::new(FakeFetcher::new()));
        let lists = service.read_lists().await.unwrap();
        let mut created = Vec::new();

        let report = service.upload_campaigns(&lists, &mut created).await.unwrap();

        assert_eq!(report, StepReport { uploaded: 1, removed: 0, failed: 2 });
        assert_eq!(ads.calls().len(), 2);
        assert!(!ads.calls()[0].partial_failure);
        assert_eq!(sheets.cell("NewCampaigns", 7, cols::STATUS), "UPLOADED");
        assert_eq!(sheets.cell("NewCampaigns", 8, cols::STATUS), "ERROR");
        assert!(sheets.cell("NewCampaigns", 8, cols::MESSAGE).contains("Globex"));
        assert!(sheets
            .cell("NewCampaigns", 9, cols::MESSAGE)
            .contains("Duplicate campaign name."));
        assert_eq!(sheets.cell("NewCampaigns", 6, cols::MESSAGE), "");

        let campaign_rows = sheets.data_rows(SheetName::Campaigns);
        assert_eq!(campaign_rows.len(), 1);
        assert_eq!(campaign_rows[0][2], "Summer");
        assert!(!campaign_rows[0][3].is_empty());
        assert_eq!(
            created,
            vec![CreatedEntity::Campaign {
                customer: "Acme".to_string(),
                campaign: "Summer".to_string(),
            }]
        );
    }
}

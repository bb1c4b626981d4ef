//! Known report types and the fields requested when the caller names none.
//!
//! Field names are passed through as given; the API is the authority on
//! which fields a report accepts.

/// A report type the download endpoint serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDefinition {
    pub name: &'static str,
    /// Fields selected by default. Empty when the caller must choose.
    pub default_fields: &'static [&'static str],
}

impl ReportDefinition {
    const fn new(name: &'static str, default_fields: &'static [&'static str]) -> Self {
        Self {
            name,
            default_fields,
        }
    }
}

const ACCOUNT_PERFORMANCE_FIELDS: &[&str] = &[
    "AccountCurrencyCode",
    "AccountDescriptiveName",
    "AccountId",
    "AccountTimeZoneId",
    "AdNetworkType1",
    "AdNetworkType2",
    "AverageCpc",
    "AverageCpm",
    "AveragePosition",
    "ClickType",
    "Clicks",
    "ContentBudgetLostImpressionShare",
    "ContentImpressionShare",
    "ContentRankLostImpressionShare",
    "ConversionCategoryName",
    "ConversionRate",
    "ConversionRateManyPerClick",
    "ConversionTrackerId",
    "ConversionTypeName",
    "ConversionValue",
    "Conversions",
    "ConversionsManyPerClick",
    "Cost",
    "CostPerConversion",
    "CostPerConversionManyPerClick",
    "CostPerEstimatedTotalConversion",
    "Ctr",
    "CustomerDescriptiveName",
    "Date",
    "DayOfWeek",
    "Device",
    "EstimatedCrossDeviceConversions",
    "EstimatedTotalConversionRate",
    "EstimatedTotalConversionValue",
    "EstimatedTotalConversionValuePerClick",
    "EstimatedTotalConversionValuePerCost",
    "EstimatedTotalConversions",
    "ExternalCustomerId",
    "HourOfDay",
    "Impressions",
    "InvalidClickRate",
    "InvalidClicks",
    "Month",
    "MonthOfYear",
    "PrimaryCompanyName",
    "PrimaryUserLogin",
    "Quarter",
    "SearchBudgetLostImpressionShare",
    "SearchExactMatchImpressionShare",
    "SearchImpressionShare",
    "SearchRankLostImpressionShare",
    "Slot",
    "TotalConvValue",
    "ValuePerConv",
    "ValuePerConvManyPerClick",
    "ValuePerConversion",
    "ValuePerConversionManyPerClick",
    "ValuePerEstimatedTotalConversion",
    "ViewThroughConversions",
    "Week",
    "Year",
];

pub const REPORTS: &[ReportDefinition] = &[
    ReportDefinition::new("ACCOUNT_PERFORMANCE_REPORT", ACCOUNT_PERFORMANCE_FIELDS),
    ReportDefinition::new("ACCOUNT_REACH_FREQUENCY_REPORT", &[]),
    ReportDefinition::new("AD_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("AD_CUSTOMIZERS_FEED_ITEM_REPORT", &[]),
    ReportDefinition::new("AD_EXTENSIONS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("ADGROUP_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("ADGROUP_REACH_FREQUENCY_REPORT", &[]),
    ReportDefinition::new("AGE_RANGE_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("AUDIENCE_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("AUTOMATIC_PLACEMENTS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("BID_GOAL_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("BUDGET_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("CALL_METRICS_CALL_DETAILS_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_AD_SCHEDULE_TARGET_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_LOCATION_TARGET_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_NEGATIVE_KEYWORDS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_NEGATIVE_LOCATIONS_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_NEGATIVE_PLACEMENTS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_PLATFORM_TARGET_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_REACH_FREQUENCY_REPORT", &[]),
    ReportDefinition::new("CAMPAIGN_SHARED_SET_REPORT", &[]),
    ReportDefinition::new("CLICK_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("CREATIVE_CONVERSION_REPORT", &[]),
    ReportDefinition::new("CRITERIA_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("DESTINATION_URL_REPORT", &[]),
    ReportDefinition::new("DISPLAY_KEYWORD_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("DISPLAY_TOPICS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("GENDER_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("GEO_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("KEYWORDLESS_CATEGORY_REPORT", &[]),
    ReportDefinition::new("KEYWORDLESS_QUERY_REPORT", &[]),
    ReportDefinition::new("KEYWORDS_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("PAID_ORGANIC_QUERY_REPORT", &[]),
    ReportDefinition::new("PLACEHOLDER_REPORT", &[]),
    ReportDefinition::new("PLACEHOLDER_FEED_ITEM_REPORT", &[]),
    ReportDefinition::new("PLACEMENT_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("PRODUCT_PARTITION_REPORT", &[]),
    ReportDefinition::new("SEARCH_QUERY_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("SHARED_SET_CRITERIA_REPORT", &[]),
    ReportDefinition::new("SHARED_SET_REPORT", &[]),
    ReportDefinition::new("SHOPPING_PERFORMANCE_REPORT", &[]),
    ReportDefinition::new("URL_PERFORMANCE_REPORT", &[]),
];

/// Looks a report up by its API name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static ReportDefinition> {
    REPORTS.iter().find(|r| r.name.eq_ignore_ascii_case(name.trim()))
}

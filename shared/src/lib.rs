use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

// ===== FILTER STATE =====

pub const DEFAULT_ROUTE_PATH: &str = "/directory";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Recent,
    CohortDesc,
    CohortAsc,
    Name,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Recent,
        SortOption::CohortDesc,
        SortOption::CohortAsc,
        SortOption::Name,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortOption::Recent => "recent",
            SortOption::CohortDesc => "cohort_desc",
            SortOption::CohortAsc => "cohort_asc",
            SortOption::Name => "name",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Recent => "Recently joined",
            SortOption::CohortDesc => "Cohort (newest first)",
            SortOption::CohortAsc => "Cohort (oldest first)",
            SortOption::Name => "Name",
        }
    }

    /// Anything outside the fixed set falls back to `Recent`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == value)
            .unwrap_or_default()
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text fields of the directory filter, in canonical URL order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Query,
    Cohort,
    Major,
    Company,
    Industry,
    Region,
    JobTitle,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::Query,
        FilterField::Cohort,
        FilterField::Major,
        FilterField::Company,
        FilterField::Industry,
        FilterField::Region,
        FilterField::JobTitle,
    ];

    /// Parameter name in the browser URL. Note `job_title` is snake_case here.
    pub fn url_key(self) -> &'static str {
        match self {
            FilterField::Query => "q",
            FilterField::Cohort => "cohort",
            FilterField::Major => "major",
            FilterField::Company => "company",
            FilterField::Industry => "industry",
            FilterField::Region => "region",
            FilterField::JobTitle => "job_title",
        }
    }

    /// Parameter name expected by the member-listing API.
    pub fn api_key(self) -> &'static str {
        match self {
            FilterField::JobTitle => "jobTitle",
            other => other.url_key(),
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FilterField::Query => "Search by name, company, title…",
            FilterField::Cohort => "Cohort",
            FilterField::Major => "Major",
            FilterField::Company => "Company",
            FilterField::Industry => "Industry",
            FilterField::Region => "Region",
            FilterField::JobTitle => "Job title",
        }
    }
}

/// Single source of truth for the directory view.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub q: String,
    pub cohort: String,
    pub major: String,
    pub company: String,
    pub industry: String,
    pub region: String,
    pub job_title: String,
    pub sort: SortOption,
    /// Zero-based.
    pub page: u32,
}

impl FilterState {
    pub fn text(&self, field: FilterField) -> &str {
        match field {
            FilterField::Query => &self.q,
            FilterField::Cohort => &self.cohort,
            FilterField::Major => &self.major,
            FilterField::Company => &self.company,
            FilterField::Industry => &self.industry,
            FilterField::Region => &self.region,
            FilterField::JobTitle => &self.job_title,
        }
    }

    fn text_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Query => &mut self.q,
            FilterField::Cohort => &mut self.cohort,
            FilterField::Major => &mut self.major,
            FilterField::Company => &mut self.company,
            FilterField::Industry => &mut self.industry,
            FilterField::Region => &mut self.region,
            FilterField::JobTitle => &mut self.job_title,
        }
    }

    /// Changing a filter invalidates the pagination position.
    pub fn with_filter(mut self, field: FilterField, value: impl Into<String>) -> Self {
        *self.text_mut(field) = value.into();
        self.page = 0;
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self.page = 0;
        self
    }

    /// The only mutator that moves the page without zeroing it.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn reset() -> Self {
        Self::default()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_active_filters(&self) -> bool {
        FilterField::ALL
            .into_iter()
            .any(|field| !self.text(field).is_empty())
    }

    pub fn member_filter(&self) -> MemberFilter {
        MemberFilter::from(self)
    }

    /// Identity of the result set: every field except the page.
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            filter: self.member_filter(),
            sort: self.sort,
        }
    }
}

/// `NaN`, negative and non-finite inputs become 0, everything else is floored.
pub fn clamp_page(value: f64) -> u32 {
    if !value.is_finite() || value < 0.0 {
        return 0;
    }
    let floored = value.floor();
    if floored >= u32::MAX as f64 {
        u32::MAX
    } else {
        floored as u32
    }
}

/// Decodes a query string (with or without the leading `?`).
///
/// Total: unknown keys are ignored, invalid values fall back to defaults,
/// and for repeated keys the first occurrence wins.
pub fn read_filters(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut filters = FilterState::default();
    let mut seen: Vec<String> = Vec::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if seen.iter().any(|seen_key| *seen_key == key) {
            continue;
        }
        seen.push(key.to_string());

        if let Some(field) = FilterField::ALL
            .into_iter()
            .find(|field| field.url_key() == key)
        {
            *filters.text_mut(field) = value.into_owned();
            continue;
        }
        match &*key {
            "sort" => filters.sort = SortOption::parse_lenient(&value),
            "page" => filters.page = parse_page(&value),
            _ => {}
        }
    }
    filters
}

fn parse_page(value: &str) -> u32 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0;
    }
    trimmed.parse::<f64>().map(clamp_page).unwrap_or(0)
}

/// Canonical query string without the leading `?`. Default-valued fields are omitted.
pub fn query_string(filters: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in FilterField::ALL {
        let value = filters.text(field);
        if !value.is_empty() {
            serializer.append_pair(field.url_key(), value);
        }
    }
    if filters.sort != SortOption::Recent {
        serializer.append_pair("sort", filters.sort.as_str());
    }
    if filters.page > 0 {
        serializer.append_pair("page", &filters.page.to_string());
    }
    serializer.finish()
}

/// Canonical relative URL. The default state maps to the bare route path.
pub fn build_url(route_path: &str, filters: &FilterState) -> String {
    let query = query_string(filters);
    if query.is_empty() {
        route_path.to_string()
    } else {
        format!("{route_path}?{query}")
    }
}

// ===== MEMBER API TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cohort: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl MemberRecord {
    /// "Job title · Company", skipping whatever is missing.
    pub fn headline(&self) -> String {
        [self.job_title.as_str(), self.company.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// Text filters sent to the backend; also the key of the total-count query.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemberFilter {
    pub q: String,
    pub cohort: String,
    pub major: String,
    pub company: String,
    pub industry: String,
    pub region: String,
    pub job_title: String,
}

impl From<&FilterState> for MemberFilter {
    fn from(filters: &FilterState) -> Self {
        Self {
            q: filters.q.clone(),
            cohort: filters.cohort.clone(),
            major: filters.major.clone(),
            company: filters.company.clone(),
            industry: filters.industry.clone(),
            region: filters.region.clone(),
            job_title: filters.job_title.clone(),
        }
    }
}

impl MemberFilter {
    fn pairs(&self) -> [(FilterField, &str); 7] {
        [
            (FilterField::Query, self.q.as_str()),
            (FilterField::Cohort, self.cohort.as_str()),
            (FilterField::Major, self.major.as_str()),
            (FilterField::Company, self.company.as_str()),
            (FilterField::Industry, self.industry.as_str()),
            (FilterField::Region, self.region.as_str()),
            (FilterField::JobTitle, self.job_title.as_str()),
        ]
    }

    fn append_to(&self, serializer: &mut form_urlencoded::Serializer<'_, String>) {
        for (field, value) in self.pairs() {
            if !value.is_empty() {
                serializer.append_pair(field.api_key(), value);
            }
        }
    }

    /// Query string for the count endpoint.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        self.append_to(&mut serializer);
        serializer.finish()
    }
}

/// Everything that defines a result set except how far it has been paged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub filter: MemberFilter,
    pub sort: SortOption,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MemberListQuery {
    pub filter: MemberFilter,
    pub sort: SortOption,
    pub limit: u32,
    pub offset: u32,
}

impl MemberListQuery {
    pub fn page(key: &QueryKey, page_index: u32, page_size: u32) -> Self {
        Self {
            filter: key.filter.clone(),
            sort: key.sort,
            limit: page_size,
            offset: page_index.saturating_mul(page_size),
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        self.filter.append_to(&mut serializer);
        serializer.append_pair("sort", self.sort.as_str());
        serializer.append_pair("limit", &self.limit.to_string());
        serializer.append_pair("offset", &self.offset.to_string());
        serializer.finish()
    }
}

// ===== ERROR TYPES =====

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse directory config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid directory config: {0}")]
    Invalid(String),
}

// ===== CONFIG TYPES =====

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DirectoryConfig {
    pub api: ApiSection,
    pub directory: DirectorySection,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "/api".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DirectorySection {
    pub route_path: String,
    pub page_size: u32,
    pub debounce_ms: u32,
    /// Forward margin of the infinite-scroll observer.
    pub scroll_root_margin_px: u32,
    pub copied_reset_ms: u32,
    pub toast_dismiss_ms: u32,
}

impl Default for DirectorySection {
    fn default() -> Self {
        Self {
            route_path: DEFAULT_ROUTE_PATH.to_string(),
            page_size: 20,
            debounce_ms: 350,
            scroll_root_margin_px: 400,
            copied_reset_ms: 2000,
            toast_dismiss_ms: 5000,
        }
    }
}

impl DirectoryConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        if !self.directory.route_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "route_path '{}' must start with '/'",
                self.directory.route_path
            )));
        }
        Ok(())
    }

    /// `base_url` without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reachable_state() -> FilterState {
        FilterState::default()
            .with_filter(FilterField::Query, "alice smith")
            .with_filter(FilterField::Cohort, "2015")
            .with_filter(FilterField::JobTitle, "R&D lead")
            .with_sort(SortOption::CohortAsc)
            .with_page(3)
    }

    #[test]
    fn test_round_trip_for_reachable_states() {
        let states = [
            FilterState::default(),
            reachable_state(),
            FilterState::default().with_filter(FilterField::Region, "Seoul / Gangnam"),
            FilterState::default().with_sort(SortOption::Name),
            FilterState::default().with_page(1),
            FilterState::default()
                .with_filter(FilterField::Company, "Acme")
                .with_filter(FilterField::Industry, "a=b&c")
                .with_filter(FilterField::Major, "컴퓨터공학"),
        ];
        for state in states {
            let url = build_url(DEFAULT_ROUTE_PATH, &state);
            let query = url.split_once('?').map(|(_, query)| query).unwrap_or("");
            assert_eq!(read_filters(query), state, "round trip through {url}");
        }
    }

    #[test]
    fn test_default_state_has_no_query_string() {
        assert_eq!(build_url(DEFAULT_ROUTE_PATH, &FilterState::default()), "/directory");
        assert_eq!(query_string(&FilterState::default()), "");
    }

    #[test]
    fn test_key_order_is_deterministic() {
        let state = FilterState::default()
            .with_sort(SortOption::Name)
            .with_filter(FilterField::JobTitle, "cto")
            .with_filter(FilterField::Query, "kim")
            .with_page(2);
        assert_eq!(
            build_url(DEFAULT_ROUTE_PATH, &state),
            "/directory?q=kim&job_title=cto&sort=name&page=2"
        );
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(-5.0), 0);
        assert_eq!(clamp_page(f64::NAN), 0);
        assert_eq!(clamp_page(3.7), 3);
        assert_eq!(clamp_page(f64::INFINITY), 0);
        assert_eq!(clamp_page(f64::NEG_INFINITY), 0);
        assert_eq!(clamp_page(0.0), 0);
        assert_eq!(clamp_page(12.0), 12);
    }

    #[test]
    fn test_read_filters_falls_back_to_defaults() {
        let filters = read_filters("?sort=popular&page=-3&unknown=1");
        assert_eq!(filters, FilterState::default());

        assert_eq!(read_filters("page=abc").page, 0);
        assert_eq!(read_filters("page=").page, 0);
        assert_eq!(read_filters("page=2.9").page, 2);
        assert_eq!(read_filters("page=Infinity").page, 0);
        assert_eq!(read_filters("sort=cohort_desc").sort, SortOption::CohortDesc);
    }

    #[test]
    fn test_read_filters_maps_job_title_and_decodes_values() {
        let filters = read_filters("job_title=Data+Scientist&company=A%26B&q=lee");
        assert_eq!(filters.job_title, "Data Scientist");
        assert_eq!(filters.company, "A&B");
        assert_eq!(filters.q, "lee");

        // camelCase is the API spelling, not the URL one
        assert_eq!(read_filters("jobTitle=cto").job_title, "");
    }

    #[test]
    fn test_read_filters_first_occurrence_wins() {
        let filters = read_filters("q=first&q=second&page=1&page=5");
        assert_eq!(filters.q, "first");
        assert_eq!(filters.page, 1);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let state = FilterState::default().with_page(2);
        assert_eq!(state.page, 2);

        let state = state.with_filter(FilterField::Company, "Acme");
        assert_eq!(state.page, 0);
        assert_eq!(state.company, "Acme");

        let state = state.with_page(4).with_sort(SortOption::Name);
        assert_eq!(state.page, 0);
    }

    #[test]
    fn test_active_filters_ignore_sort_and_page() {
        let sorted = FilterState::default().with_sort(SortOption::Name).with_page(3);
        assert!(!sorted.has_active_filters());
        assert!(!sorted.is_default());
        assert!(sorted.with_filter(FilterField::Industry, "Finance").has_active_filters());
    }

    #[test]
    fn test_query_key_ignores_page() {
        let state = reachable_state();
        assert_eq!(state.query_key(), state.clone().with_page(0).query_key());
        assert_ne!(
            state.query_key(),
            state.clone().with_sort(SortOption::Name).query_key()
        );
    }

    #[test]
    fn test_member_list_query_string() {
        let key = FilterState::default()
            .with_filter(FilterField::JobTitle, "cto")
            .with_filter(FilterField::Query, "park")
            .query_key();
        let query = MemberListQuery::page(&key, 2, 10);
        assert_eq!(query.offset, 20);
        assert_eq!(
            query.to_query_string(),
            "q=park&jobTitle=cto&sort=recent&limit=10&offset=20"
        );
        assert_eq!(key.filter.to_query_string(), "q=park&jobTitle=cto");
    }

    #[test]
    fn test_member_record_tolerates_missing_fields() {
        let record: MemberRecord = serde_json::from_str(
            r#"{"id":"m1","name":"Jiwoo Park","jobTitle":"Engineer","company":"Acme"}"#,
        )
        .unwrap();
        assert_eq!(record.job_title, "Engineer");
        assert_eq!(record.cohort, "");
        assert_eq!(record.avatar_url, None);
        assert_eq!(record.headline(), "Engineer · Acme");
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = DirectoryConfig::from_toml_str("").unwrap();
        assert_eq!(config, DirectoryConfig::default());
        assert_eq!(config.directory.debounce_ms, 350);

        let config = DirectoryConfig::from_toml_str(
            "[api]\nbase_url = \"https://alumni.example.org/api/\"\n\n[directory]\npage_size = 10\n",
        )
        .unwrap();
        assert_eq!(config.directory.page_size, 10);
        assert_eq!(config.directory.route_path, "/directory");
        assert_eq!(config.api_base(), "https://alumni.example.org/api");
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            DirectoryConfig::from_toml_str("[directory]\npage_size = 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DirectoryConfig::from_toml_str("[directory]\nroute_path = \"directory\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DirectoryConfig::from_toml_str("[directory\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}

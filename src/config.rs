/// Constants shared by the background worker, content script and popup

/// Query parameter carrying the "posted within" filter on job search URLs
pub const URL_PARAM_NAME: &str = "f_TPR";

/// Prefix the job site expects in front of the seconds value
pub const URL_PARAM_PREFIX: &str = "r";

/// Host and path that identify a job search page
pub const JOBS_HOST: &str = "linkedin.com";
pub const JOBS_PATH_PREFIX: &str = "/jobs/";

/// chrome.storage.local keys
pub const STORAGE_KEY_FILTER_SECONDS: &str = "filterSeconds";
pub const STORAGE_KEY_ENABLED: &str = "enabled";

/// Default filter window: one hour
pub const DEFAULT_FILTER_SECONDS: u64 = 3600;
pub const DEFAULT_ENABLED: bool = true;

/// Presets offered by the settings popup (seconds, label)
pub const PANEL_PRESETS: [(u64, &str); 4] = [
    (3600, "Last Hour"),
    (21600, "Last 6 Hours"),
    (86400, "Last 24 Hours"),
    (604800, "Last Week"),
];

/// Presets injected ahead of the site's own "date posted" options
pub const CUSTOM_PAGE_PRESETS: [(u64, &str); 3] = [
    (3600, "Past hour"),
    (21600, "Past 6 hours"),
    (43200, "Past 12 hours"),
];

/// Notice durations in the popup (milliseconds)
pub const SAVE_MESSAGE_DURATION_MS: u32 = 2000;
pub const ERROR_MESSAGE_DURATION_MS: u32 = 3000;

/// Page selectors used by the content script
pub const FILTER_CONTROL_SELECTOR: &str = "input[name=\"f_TPR\"]";
pub const OPTIONS_LIST_SELECTOR: &str =
    "#hoverable-outlet-date-posted-filter-value ul.search-reusables__collection-values-container";
pub const OPTION_INPUT_SELECTOR: &str = "input[name=\"date-posted-filter-value\"]";
pub const OPTION_INPUT_NAME: &str = "date-posted-filter-value";
pub const DROPDOWN_SELECTOR: &str = "#hoverable-outlet-date-posted-filter-value .artdeco-hoverable-content";
pub const DROPDOWN_VISIBILITY_ATTRIBUTE: &str = "aria-hidden";
pub const FILTER_BUTTON_SELECTOR: &str = "#searchFilter_timePostedRange";

/// Marker attribute on injected list items
pub const CUSTOM_OPTION_MARKER: &str = "data-quickapply-custom";

/// Property set on `window` once the content script has initialized
pub const SESSION_MARKER: &str = "__quickApplySession";

/// Polling for the lazily rendered filter widget
pub const POLL_INTERVAL_MS: i32 = 250;
pub const POLL_MAX_ATTEMPTS: u32 = 40;

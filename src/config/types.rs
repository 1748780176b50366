use crate::url::is_valid_absolute_url;
use crate::SitemapError;
use rand::Rng;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Sumi-Sitemap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub site: Vec<SiteEntry>,
}

impl Config {
    /// Root URLs of every configured site, in file order
    pub fn roots(&self) -> Vec<String> {
        self.site.iter().map(|s| s.root.clone()).collect()
    }
}

/// Crawler behavior configuration, shared by every site in a batch
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link depth from the root (the root itself is depth 0)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of parallel workers per site
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Maximum number of fetches per site
    #[serde(rename = "max-requests", default = "default_max_requests")]
    pub max_requests: u32,

    /// Lower bound of the per-fetch politeness delay (seconds)
    #[serde(rename = "politeness-delay-min", default = "default_delay_min")]
    pub politeness_delay_min: f64,

    /// Upper bound of the per-fetch politeness delay (seconds)
    #[serde(rename = "politeness-delay-max", default = "default_delay_max")]
    pub politeness_delay_max: f64,

    /// HTTP request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_max_depth() -> u32 {
    3
}

fn default_concurrency() -> u32 {
    10
}

fn default_max_requests() -> u32 {
    100
}

fn default_delay_min() -> f64 {
    4.0
}

fn default_delay_max() -> f64 {
    7.0
}

fn default_request_timeout() -> u64 {
    5
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            max_requests: default_max_requests(),
            politeness_delay_min: default_delay_min(),
            politeness_delay_max: default_delay_max(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl CrawlerConfig {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: Option<String>,
}

fn default_crawler_name() -> String {
    "sumi-sitemap".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            contact_email: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// `Name/Version`, followed by ` (+ContactURL; ContactEmail)` when any
    /// contact detail is configured.
    pub fn header_value(&self) -> String {
        let base = format!("{}/{}", self.crawler_name, self.crawler_version);
        match (&self.contact_url, &self.contact_email) {
            (Some(url), Some(email)) => format!("{} (+{}; {})", base, url, email),
            (Some(url), None) => format!("{} (+{})", base, url),
            (None, Some(email)) => format!("{} ({})", base, email),
            (None, None) => base,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one `<host>_sitemap.txt` file per site
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Optional path of the markdown batch summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<PathBuf>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            summary_path: None,
        }
    }
}

/// One site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Root URL the crawl starts from; also defines the origin scope
    pub root: String,
}

/// Bounds of the random pause taken before each fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolitenessDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PolitenessDelay {
    /// No delay at all
    pub const NONE: PolitenessDelay = PolitenessDelay {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// Creates a delay range from bounds in seconds
    ///
    /// Negative or non-finite bounds collapse to zero and `max` is raised to
    /// `min` if needed; validated configs never hit either case.
    pub fn from_secs_f64(min: f64, max: f64) -> Self {
        let min = Duration::try_from_secs_f64(min).unwrap_or(Duration::ZERO);
        let max = Duration::try_from_secs_f64(max).unwrap_or(Duration::ZERO);
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Draws a duration uniformly from `[min, max]`
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

/// Immutable configuration of a single crawl session
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Root URL exactly as configured; the first entry of the sitemap
    pub root: String,

    /// Parsed root, used to resolve root-relative links
    pub root_url: Url,

    pub max_depth: u32,

    /// Number of workers (>= 1)
    pub concurrency: usize,

    /// Global fetch budget (>= 1)
    pub max_requests: u32,

    pub politeness_delay: PolitenessDelay,
}

impl CrawlConfig {
    /// Builds a session configuration from a root URL and crawler settings
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlConfig)` - The root is a valid absolute URL
    /// * `Err(SitemapError::InvalidRoot)` - The root is malformed or has no host
    pub fn for_root(root: &str, crawler: &CrawlerConfig) -> crate::Result<Self> {
        if !is_valid_absolute_url(root) {
            return Err(SitemapError::InvalidRoot {
                url: root.to_string(),
            });
        }
        let root_url = Url::parse(root)?;

        Ok(Self {
            root: root.to_string(),
            root_url,
            max_depth: crawler.max_depth,
            concurrency: crawler.concurrency.max(1) as usize,
            max_requests: crawler.max_requests.max(1),
            politeness_delay: PolitenessDelay::from_secs_f64(
                crawler.politeness_delay_min,
                crawler.politeness_delay_max,
            ),
        })
    }

    /// Overrides the politeness delay
    pub fn with_politeness_delay(mut self, delay: PolitenessDelay) -> Self {
        self.politeness_delay = delay;
        self
    }
}

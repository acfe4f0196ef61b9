//! User agent and browser header generation

use rand::seq::SliceRandom;
use rand::Rng;

const CHROME_VERSIONS: &[&str] = &["124.0.0.0", "125.0.0.0", "126.0.0.0", "127.0.0.0"];
const FIREFOX_VERSIONS: &[&str] = &["125.0", "126.0", "127.0", "128.0"];
const SAFARI_VERSIONS: &[&str] = &["17.4", "17.5"];

const OS_STRINGS: &[&str] = &[
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

/// Generate a random but realistic desktop user agent string
pub fn generate_user_agent() -> String {
    let mut rng = rand::thread_rng();
    let os = OS_STRINGS.choose(&mut rng).copied().unwrap_or(OS_STRINGS[0]);

    match rng.gen_range(0..10u8) {
        // Chrome 60%
        0..=5 => {
            let chrome = CHROME_VERSIONS.choose(&mut rng).copied().unwrap_or(CHROME_VERSIONS[0]);
            format!(
                "Mozilla/5.0 ({os}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Safari/537.36"
            )
        }
        // Firefox 30%
        6..=8 => {
            let firefox = FIREFOX_VERSIONS.choose(&mut rng).copied().unwrap_or(FIREFOX_VERSIONS[0]);
            format!("Mozilla/5.0 ({os}; rv:{firefox}) Gecko/20100101 Firefox/{firefox}")
        }
        // Safari only ships on Mac
        _ => {
            let safari = SAFARI_VERSIONS.choose(&mut rng).copied().unwrap_or(SAFARI_VERSIONS[0]);
            format!(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{safari} Safari/605.1.15"
            )
        }
    }
}

/// Standard accept header for HTML requests
pub fn accept_html() -> &'static str {
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
}

/// Accept-Language header for a locale such as `de-CH` or `fr`
pub fn accept_language(locale: &str) -> String {
    let locale = locale.trim().replace('_', "-");
    let lang = locale.split('-').next().unwrap_or_default().to_ascii_lowercase();

    match (lang.as_str(), locale.contains('-')) {
        ("" | "all", _) | ("en", false) => "en-US,en;q=0.9".to_string(),
        ("en", true) => format!("{locale},en;q=0.9"),
        (_, true) => format!("{locale},{lang};q=0.9,en;q=0.8"),
        (_, false) => format!("{lang},en;q=0.8"),
    }
}

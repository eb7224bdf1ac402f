use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Browser launch configuration. A config is snapshotted into the registry
/// when a driver is created; changing it afterwards has no retroactive
/// effect on live drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport: Viewport,
    pub proxy: Option<String>,
    pub load_images: bool,
    pub user_agent: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport: Viewport::default(),
            proxy: None,
            load_images: true,
            user_agent: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn load_images(mut self, load: bool) -> Self {
        self.load_images = load;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 14_7_1 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.2 Mobile/15E148 Safari/604.1";

/// Named, pre-built browser configurations.
pub struct BrowserPresets;

impl BrowserPresets {
    pub fn default_preset() -> BrowserConfig {
        BrowserConfig::default()
    }

    pub fn headless() -> BrowserConfig {
        BrowserConfig::default().headless(true)
    }

    /// Visible window, for local debugging and demos.
    pub fn headed() -> BrowserConfig {
        BrowserConfig::default().headless(false)
    }

    /// Trades fidelity for speed: no images, no first-run chrome.
    pub fn performance() -> BrowserConfig {
        BrowserConfig::default()
            .load_images(false)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-popup-blocking")
    }

    /// Masks the usual automation fingerprints.
    pub fn stealth() -> BrowserConfig {
        BrowserConfig::default()
            .user_agent(DESKTOP_UA)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-sandbox")
    }

    pub fn mobile() -> BrowserConfig {
        BrowserConfig::default()
            .viewport(375, 812)
            .user_agent(MOBILE_UA)
    }

    /// Look a preset up by its settings-file name.
    pub fn by_name(name: &str) -> Option<BrowserConfig> {
        match name {
            "default" => Some(Self::default_preset()),
            "headless" => Some(Self::headless()),
            "headed" => Some(Self::headed()),
            "performance" => Some(Self::performance()),
            "stealth" => Some(Self::stealth()),
            "mobile" => Some(Self::mobile()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_headless_1280x720() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert!(config.load_images);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn builder_methods_chain() {
        let config = BrowserConfig::default()
            .headless(false)
            .viewport(1920, 1080)
            .proxy("http://127.0.0.1:8080")
            .arg("--disable-gpu");

        assert!(!config.headless);
        assert_eq!(config.viewport.width, 1920);
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.extra_args, vec!["--disable-gpu".to_string()]);
    }

    #[test]
    fn performance_preset_disables_images() {
        let config = BrowserPresets::performance();
        assert!(!config.load_images);
        assert!(config.extra_args.contains(&"--no-first-run".to_string()));
    }

    #[test]
    fn preset_lookup_by_name() {
        assert!(BrowserPresets::by_name("stealth").is_some());
        assert!(BrowserPresets::by_name("mobile").is_some());
        assert!(BrowserPresets::by_name("warp-speed").is_none());

        let mobile = BrowserPresets::by_name("mobile").unwrap();
        assert_eq!(mobile.viewport.width, 375);
        assert!(mobile.user_agent.unwrap().contains("iPhone"));
    }
}

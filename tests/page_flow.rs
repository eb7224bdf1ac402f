use pageforge::testing::MockDriver;
use pageforge::utils::ReportGenerator;
use pageforge::{
    AutomationError, BrowserConfig, DriverManager, DriverTrait, Page, PageObject, WaitOptions,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_INPUT: &str = "#search";
const SEARCH_BUTTON: &str = "#go";
const RESULTS: &str = "#results";

struct SearchPage {
    page: Page,
}

impl SearchPage {
    fn new(driver: Arc<dyn DriverTrait>) -> Self {
        Self {
            page: Page::new(driver)
                .with_url("https://test.example.com/")
                .with_screenshots_dir(std::env::temp_dir().join("pageforge-test-shots")),
        }
    }

    async fn search(&self, keyword: &str) -> pageforge::Result<()> {
        self.page
            .elements
            .input_text(self.locator("search_input")?, keyword)
            .await?;
        self.page
            .elements
            .click(self.locator("search_button")?)
            .await?;
        self.page
            .waits
            .wait_for_element_displayed(
                self.locator("results")?,
                WaitOptions::default()
                    .with_timeout(Duration::from_millis(400))
                    .with_poll_interval(Duration::from_millis(25)),
            )
            .await
    }

    async fn result_text(&self) -> pageforge::Result<String> {
        self.page.elements.get_text(self.locator("results")?).await
    }
}

#[async_trait::async_trait]
impl PageObject for SearchPage {
    fn page(&self) -> &Page {
        &self.page
    }

    fn page_elements(&self) -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("search_input", SEARCH_INPUT),
            ("search_button", SEARCH_BUTTON),
            ("results", RESULTS),
        ])
    }

    async fn is_loaded(&self) -> pageforge::Result<bool> {
        Ok(self.page.elements.is_displayed(SEARCH_INPUT).await)
    }

    fn load_timeout(&self) -> Duration {
        Duration::from_millis(400)
    }
}

fn search_fixture() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    driver.set_title("Acme Search");
    driver.add_element(SEARCH_INPUT, "");
    driver.add_element(SEARCH_BUTTON, "Search");
    driver
}

#[tokio::test]
async fn smoke_page_load() {
    let manager = DriverManager::new();
    let driver = search_fixture();
    manager
        .register("smoke", driver.clone(), BrowserConfig::default())
        .unwrap();

    let page = SearchPage::new(manager.get("smoke").unwrap());
    page.open().await.unwrap();

    assert!(page.is_loaded().await.unwrap());
    assert_eq!(page.page().title().await.unwrap(), "Acme Search");

    manager.close("smoke").await.unwrap();
    assert!(driver.is_closed());
}

#[tokio::test]
async fn smoke_search_flow() {
    let driver = search_fixture();
    let page = SearchPage::new(driver.clone());
    page.open().await.unwrap();

    // results appear shortly after the search is submitted
    let results_driver = driver.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        results_driver.add_element(RESULTS, "3 results for \"rust\"");
    });

    page.search("rust").await.unwrap();

    assert_eq!(driver.inputs(), vec![(SEARCH_INPUT.to_string(), "rust".to_string())]);
    assert_eq!(driver.clicks(), vec![SEARCH_BUTTON.to_string()]);
    assert_eq!(page.result_text().await.unwrap(), "3 results for \"rust\"");
}

#[tokio::test]
async fn regression_search_timeout_reports_failure() {
    let driver = search_fixture();
    let page = SearchPage::new(driver);
    page.open().await.unwrap();

    // results never appear
    let report = ReportGenerator::new();
    let started = std::time::Instant::now();
    let outcome = page.search("nothing").await;

    match outcome {
        Err(AutomationError::WaitTimeout { ref description, .. }) => {
            assert!(description.contains(RESULTS));
            report.failed(
                "regression_search_timeout",
                started.elapsed().as_millis() as u64,
                description,
                None,
            );
        }
        other => panic!("expected WaitTimeout, got {other:?}"),
    }

    let summary = report.summary();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total, 1);
}

#[tokio::test]
async fn regression_drivers_stay_isolated_per_test() {
    let manager = DriverManager::new();
    let first = search_fixture();
    let second = search_fixture();

    manager
        .register("test_a", first.clone(), BrowserConfig::default())
        .unwrap();
    manager
        .register("test_b", second.clone(), BrowserConfig::default())
        .unwrap();

    let page_a = SearchPage::new(manager.get("test_a").unwrap());
    page_a.open().await.unwrap();
    page_a
        .page()
        .elements
        .click(SEARCH_BUTTON)
        .await
        .unwrap();

    // actions on one driver never leak into the other
    assert_eq!(first.clicks().len(), 1);
    assert!(second.clicks().is_empty());

    manager.close("test_a").await.unwrap();
    assert!(manager.get("test_b").is_ok());
    manager.close_all().await;
    assert!(manager.is_empty());
}

#[tokio::test]
async fn regression_scoped_driver_cleans_up_after_failures() {
    let manager = DriverManager::new();

    let attempt: pageforge::Result<()> = async {
        let scoped = manager.scoped_with(search_fixture())?;
        let page = SearchPage::new(scoped.driver());
        page.open().await?;
        // element was never scripted, so this fails and short-circuits
        page.page().elements.get_text("#missing").await?;
        Ok(())
    }
    .await;

    assert!(attempt.is_err());
    assert!(manager.is_empty(), "registry must return to baseline");
}

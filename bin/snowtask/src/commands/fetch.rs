use anyhow::{bail, Context};
use tracing::debug;

use snowtask_browser::{BrowserEngine, BrowserSession, LaunchOptions};
use snowtask_core::{Config, EnvCredentials, Paths, Task};
use snowtask_scrape::{fetch_tasks, CdpPage};

/// Launch a browser, run the scrape and print the result.
pub async fn run(json: bool, headed: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths).context("loading config")?;

    if config.url.is_empty() {
        bail!(
            "no task-list URL configured; run `snowtask config init` and edit {}",
            paths.config_file().display()
        );
    }
    if config.username.is_empty() {
        bail!(
            "no username configured; edit {}",
            paths.config_file().display()
        );
    }

    paths.ensure_dirs().context("creating data directories")?;

    let opts = LaunchOptions {
        engine: BrowserEngine::from_str(&config.browser),
        headless: config.headless && !headed,
        user_data_dir: paths.sessions_dir().join("default"),
    };

    let mut session = BrowserSession::launch(&opts)
        .await
        .context("launching browser")?;

    // The page handle borrows the session; drop it before closing so the
    // browser is shut down on success and failure alike.
    let result = {
        let page = CdpPage::new(&session.cdp);
        fetch_tasks(&page, &config, &EnvCredentials).await
    };
    session.close().await;
    debug!("browser session closed");

    let tasks = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else {
        print_table(&tasks);
    }

    Ok(())
}

fn print_table(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks assigned.");
        return;
    }

    let number_w = column_width(tasks.iter().map(|t| t.number.as_str()), "NUMBER");
    let state_w = column_width(tasks.iter().map(|t| t.state.as_str()), "STATE");
    let assigned_w = column_width(tasks.iter().map(|t| t.assigned_to.as_str()), "ASSIGNED TO");

    println!(
        "{:<number_w$}  {:<state_w$}  {:<assigned_w$}  {:<19}  DESCRIPTION",
        "NUMBER", "STATE", "ASSIGNED TO", "OPENED"
    );
    for task in tasks {
        println!(
            "{:<number_w$}  {:<state_w$}  {:<assigned_w$}  {}  {}",
            task.number,
            task.state,
            task.assigned_to,
            task.opened.format("%Y-%m-%d %H:%M:%S"),
            task.description,
        );
    }
    println!();
    println!("{} task(s)", tasks.len());
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}

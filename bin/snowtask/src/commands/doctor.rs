use snowtask_browser::session::list_available_browsers;
use snowtask_core::{Config, Paths};

/// Run environment diagnostics.
pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();

    println!();
    println!("snowtask doctor — Environment Diagnostics");
    println!("=========================================");
    println!();

    // --- 1. Config ---
    println!("Configuration");
    let config_path = paths.config_file();
    if config_path.exists() {
        print_ok("Config file exists", &config_path.display().to_string());
    } else {
        print_err("Config file not found", "Run `snowtask config init`");
    }

    let config = Config::load_or_default(&paths)?;
    if config.url.is_empty() {
        print_err("No task-list URL configured", "Edit config.json");
    } else {
        print_ok("Task-list URL configured", &config.url);
    }
    if config.username.is_empty() {
        print_err("No username configured", "Edit config.json");
    } else {
        print_ok("Username configured", &config.username);
    }
    println!();

    // --- 2. Browser ---
    println!("Browser");
    let browsers = list_available_browsers();
    if browsers.is_empty() {
        print_err(
            "No supported browser found",
            "Install Microsoft Edge or Google Chrome",
        );
    } else {
        for (engine, path) in &browsers {
            print_ok(engine.name(), path);
        }
    }
    let wanted = config.browser.as_str();
    if !browsers.iter().any(|(e, _)| e.name() == wanted.to_lowercase()) && !browsers.is_empty() {
        print_warn(
            &format!("Configured browser '{}' not found", wanted),
            "Another available engine will not be used automatically",
        );
    }
    println!();

    // --- 3. Credentials ---
    // Only presence is reported, never a value.
    println!("Credentials");
    let service_var = format!(
        "{}_PASSWORD",
        config
            .service
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect::<String>()
    );
    let has_generic = std::env::var("SNOWTASK_PASSWORD").map(|v| !v.is_empty()) == Ok(true);
    let has_service = std::env::var(&service_var).map(|v| !v.is_empty()) == Ok(true);
    if has_generic {
        print_ok("SNOWTASK_PASSWORD is set", "");
    } else if has_service {
        print_ok(&format!("{} is set", service_var), "");
    } else {
        print_err(
            "No password in environment",
            &format!("Set SNOWTASK_PASSWORD or {}", service_var),
        );
    }
    println!();

    Ok(())
}

fn print_ok(label: &str, hint: &str) {
    if hint.is_empty() {
        println!("  ✅ {}", label);
    } else {
        println!("  ✅ {} — {}", label, hint);
    }
}

fn print_warn(label: &str, hint: &str) {
    if hint.is_empty() {
        println!("  ⚠️  {}", label);
    } else {
        println!("  ⚠️  {} — {}", label, hint);
    }
}

fn print_err(label: &str, hint: &str) {
    if hint.is_empty() {
        println!("  ❌ {}", label);
    } else {
        println!("  ❌ {} — {}", label, hint);
    }
}

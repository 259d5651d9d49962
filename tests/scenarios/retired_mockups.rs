//! Scenario: Retiring a Page
//!
//! Journey: A page is dropped from the design; its generated code lingers
//! until the team opts into removal.
//!
//! Steps:
//! 1. Generate two pages
//! 2. Delete one mockup; generate reports the orphan and keeps its files
//! 3. Enable orphan removal in mocksmith.toml; generate removes the files
//!    and drops the route
//!
//! Success Criteria:
//! - Nothing is deleted without opting in
//! - The route registry only lists live pages

use crate::common::*;

/// SCENARIO: Orphaned output is reported, then removed on request
#[test]
fn scenario_retired_mockup_is_removed_only_when_allowed() {
    let env = TestEnv::builder()
        .with_mockup("home.html", HOME_HTML)
        .with_mockup("about.html", ABOUT_HTML)
        .build();

    // Step 1
    assert_exit_code!(env.run(&["generate"]), 0);
    let routes = env.read_generated("src/routes.generated.ts");
    assert!(routes.contains("AboutPage"));

    // Step 2
    env.remove_mockup("about.html");
    let result = env.run(&["generate"]);
    assert_exit_code!(result, 1);
    assert_output_contains!(result, "orphaned");
    assert_generated!(env, "src/pages/about/AboutPage.tsx");

    // Step 3
    env.write_project_file(
        "mocksmith.toml",
        r#"
[generate]
allow_orphan_removal = true
"#,
    );
    let result = env.run(&["generate"]);
    assert_exit_code!(result, 0);
    assert_not_generated!(env, "src/pages/about/AboutPage.tsx");
    assert_generated!(env, "src/pages/home/HomePage.tsx");

    let routes = env.read_generated("src/routes.generated.ts");
    assert!(!routes.contains("AboutPage"), "{}", routes);
    assert!(routes.contains("HomePage"), "{}", routes);

    let log = env.latest_run_log();
    let about = log["records"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["key"] == "about")
        .unwrap();
    assert_eq!(about["action"], "removed");
}

/// SCENARIO: A mockup that comes back after removal is generated fresh
#[test]
fn scenario_restored_mockup_is_generated_again() {
    let env = TestEnv::builder()
        .with_mockup("about.html", ABOUT_HTML)
        .with_config(
            r#"
[generate]
allow_orphan_removal = true
"#,
        )
        .build();
    assert_exit_code!(env.run(&["generate"]), 0);

    env.remove_mockup("about.html");
    assert_exit_code!(env.run(&["generate"]), 0);
    assert_not_generated!(env, "src/pages/about/AboutPage.tsx");

    env.write_mockup("about.html", ABOUT_HTML_V2);
    let result = env.run(&["generate"]);

    assert_exit_code!(result, 0);
    assert!(env
        .read_generated("src/pages/about/AboutPage.tsx")
        .contains("About the team"));
}

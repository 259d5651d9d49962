//! Scenario: Iterating on a Design
//!
//! Journey: A designer keeps revising mockups while a developer works on
//! the generated code.
//!
//! Steps:
//! 1. First generate scaffolds every page
//! 2. Designer revises one mockup; plan flags it, generate refuses to update
//! 3. Generate with --allow-update brings the page up to date
//! 4. Developer hand-edits a generated component
//! 5. Designer revises again; the hand edit survives
//!
//! Success Criteria:
//! - Mockup tree is never modified
//! - No generated file changes without permission
//! - Every run leaves a run log

use crate::common::*;

const HOME_V2: &str = r#"<!doctype html>
<html>
<head><title>Home</title></head>
<body>
<main>
  <section data-component="hero"><h1>Welcome back</h1></section>
  <section data-component="features"><ul><li>Fast</li><li>Calm</li></ul></section>
</main>
</body>
</html>
"#;

const HOME_V3: &str = r#"<!doctype html>
<html>
<head><title>Home</title></head>
<body>
<main>
  <section data-component="hero"><h1>Welcome home</h1></section>
  <section data-component="features"><ul><li>Fast</li></ul></section>
</main>
</body>
</html>
"#;

/// SCENARIO: Design changes flow into code only when allowed
#[test]
fn scenario_design_iteration_respects_permission_and_hand_edits() {
    let env = TestEnv::builder()
        .with_mockup("home.html", HOME_HTML)
        .with_mockup("about.html", ABOUT_HTML)
        .build();

    // Step 1: Scaffold
    let result = env.run(&["generate"]);
    assert_exit_code!(result, 0);
    assert_generated!(env, "src/pages/home/HomePage.tsx");
    assert_generated!(env, "src/pages/about/AboutPage.tsx");
    let scaffold = env.snapshot("src");

    // Step 2: Designer revises home
    env.write_mockup("home.html", HOME_V2);

    let plan = env.run(&["plan"]);
    assert_exit_code!(plan, 0);
    assert_output_contains!(plan, "home");
    assert_output_contains!(plan, "update-not-permitted");

    let refused = env.run(&["generate"]);
    assert_exit_code!(refused, 1);
    assert_eq!(env.snapshot("src"), scaffold, "Step 2: nothing may change");

    // Step 3: Apply the update
    let applied = env.run(&["generate", "--allow-update", "--yes"]);
    assert_exit_code!(applied, 0);
    assert!(env
        .read_generated("src/components/home/Hero.tsx")
        .contains("Welcome back"));
    assert_eq!(
        env.read_generated("src/pages/about/AboutPage.tsx"),
        scaffold
            .iter()
            .find(|(path, _)| path == "pages/about/AboutPage.tsx")
            .map(|(_, content)| content.clone())
            .unwrap(),
        "Step 3: unrelated pages stay byte-identical"
    );

    // Step 4: Developer customizes the hero
    env.write_project_file(
        "src/components/home/Hero.tsx",
        "export default function Hero() { return null; }\n",
    );

    // Step 5: Designer revises again
    env.write_mockup("home.html", HOME_V3);
    let mockups = env.snapshot("mockups");
    let result = env.run(&["generate", "--allow-update", "--yes"]);
    assert_exit_code!(result, 1);
    assert_output_contains!(result, "manual-edit");
    assert_eq!(
        env.read_generated("src/components/home/Hero.tsx"),
        "export default function Hero() { return null; }\n"
    );

    // The mockup tree is read-only to every run
    assert_eq!(env.snapshot("mockups"), mockups);

    assert_eq!(env.run_logs().len(), 4);
}

/// SCENARIO: A narrowed run leaves the rest of the project alone
#[test]
fn scenario_only_filter_while_other_pages_drift() {
    let env = TestEnv::builder()
        .with_mockup("home.html", HOME_HTML)
        .with_mockup("about.html", ABOUT_HTML)
        .build();
    assert_exit_code!(env.run(&["generate"]), 0);
    let home_page = env.read_generated("src/components/home/Hero.tsx");

    env.write_mockup("home.html", HOME_V2);
    env.write_mockup("about.html", ABOUT_HTML_V2);

    let result = env.run(&["generate", "--allow-update", "--yes", "--only", "about"]);

    assert_exit_code!(result, 0);
    assert!(env
        .read_generated("src/pages/about/AboutPage.tsx")
        .contains("About the team"));
    assert_eq!(env.read_generated("src/components/home/Hero.tsx"), home_page);

    let plan = env.run(&["plan", "--allow-update"]);
    assert_exit_code!(plan, 0);
    assert_output_contains!(plan, "1 update");
}

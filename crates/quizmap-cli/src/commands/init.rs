//! The `quizmap init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizmap.toml
    if std::path::Path::new("quizmap.toml").exists() {
        println!("quizmap.toml already exists, skipping.");
    } else {
        std::fs::write("quizmap.toml", SAMPLE_CONFIG)?;
        println!("Created quizmap.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizzes/example.toml with your own questions and results");
    println!("  2. Run: quizmap validate --quiz quizzes/example.toml");
    println!("  3. Run: quizmap diagnose --quiz quizzes/example.toml --answers answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmap configuration

trend_window_days = 30
confidence = 0.95
parallel = true

# Where `quizmap stats --save` writes reports
output_dir = "./quizmap-results"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "A small two-axis quiz to get started"

[[axes]]
id = 1
name = "Energy"
description = "Where you draw energy from"
positive_name = "Outgoing"
negative_name = "Reserved"

[[axes]]
id = 2
name = "Approach"
description = "How you tackle a task"
positive_name = "Structured"
negative_name = "Spontaneous"

[[questions]]
id = "q1"
text = "I feel recharged after a busy social event."
weights = { x = 1.0, y = 0.0 }

[[questions]]
id = "q2"
text = "I plan my week before it starts."
weights = { x = 0.0, y = 1.0 }

[[questions]]
id = "q3"
text = "I like to organize group activities."
weights = { x = 0.5, y = 0.5 }

[[results]]
id = "host"
name = "The Host"
description = "Outgoing and organized."
x = 0.5
y = 0.5

[[results]]
id = "explorer"
name = "The Explorer"
description = "Outgoing and spontaneous."
x = 0.5
y = -0.5

[[results]]
id = "architect"
name = "The Architect"
description = "Reserved and structured."
x = -0.5
y = 0.5

[[results]]
id = "drifter"
name = "The Drifter"
description = "Reserved and spontaneous."
x = -0.5
y = -0.5
"#;

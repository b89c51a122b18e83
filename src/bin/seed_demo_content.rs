// ABOUTME: Demo content seeding utility for the Stillpark catalog
// ABOUTME: Inserts a small set of published experiences with ordered steps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stillpark Wellness

//! # Demo Content Seeder
//!
//! Populates an empty database with a starter catalog so a fresh deployment
//! has something to show.
//!
//! ```bash
//! cargo run --bin seed-demo-content -- --database-url sqlite:./data/stillpark.db
//! ```

#![allow(clippy::expect_used)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stillpark_server::constants::defaults;
use stillpark_server::database::{Database, NewExperience, NewStep};
use stillpark_server::models::{Difficulty, ExperienceStatus, StepType, Visibility};

#[derive(Parser)]
#[command(
    name = "seed-demo-content",
    about = "Stillpark demo content seeder",
    long_about = "Insert a starter catalog of experiences and steps"
)]
struct Args {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

struct DemoStep {
    title: &'static str,
    content: &'static str,
    step_type: StepType,
    duration_sec: Option<i64>,
}

struct DemoExperience {
    title: &'static str,
    description: &'static str,
    visibility: Visibility,
    difficulty: Difficulty,
    duration_min: i64,
    cover_emoji: &'static str,
    steps: &'static [DemoStep],
}

const DEMO_EXPERIENCES: &[DemoExperience] = &[
    DemoExperience {
        title: "Rollercoaster of Fears",
        description: "Face your fears on a safe, guided ride.",
        visibility: Visibility::Free,
        difficulty: Difficulty::Easy,
        duration_min: 10,
        cover_emoji: "🎢",
        steps: &[
            DemoStep {
                title: "Buckle in",
                content: "Settle into a comfortable position and take three slow breaths.",
                step_type: StepType::Breath,
                duration_sec: Some(60),
            },
            DemoStep {
                title: "Name one fear",
                content: "Write down a single fear that visited you this week.",
                step_type: StepType::Prompt,
                duration_sec: Some(120),
            },
            DemoStep {
                title: "The view from the top",
                content: "Imagine looking at that fear from above. What does it protect?",
                step_type: StepType::Text,
                duration_sec: Some(90),
            },
        ],
    },
    DemoExperience {
        title: "Maze of Decisions",
        description: "Find your way out of everyday dilemmas.",
        visibility: Visibility::Free,
        difficulty: Difficulty::Medium,
        duration_min: 15,
        cover_emoji: "🌀",
        steps: &[
            DemoStep {
                title: "Pick a crossroads",
                content: "Choose one decision you have been postponing.",
                step_type: StepType::Choice,
                duration_sec: None,
            },
            DemoStep {
                title: "Walk both paths",
                content: "Describe a day of your life one year after each option.",
                step_type: StepType::Prompt,
                duration_sec: Some(240),
            },
        ],
    },
    DemoExperience {
        title: "Circular Mirror",
        description: "A deep self-reflection practice for returning visitors.",
        visibility: Visibility::Premium,
        difficulty: Difficulty::Hard,
        duration_min: 20,
        cover_emoji: "🪞",
        steps: &[
            DemoStep {
                title: "Quiet the room",
                content: "Guided audio to settle before the mirror work begins.",
                step_type: StepType::Audio,
                duration_sec: Some(180),
            },
            DemoStep {
                title: "First reflection",
                content: "Which recurring thought looked back at you this month?",
                step_type: StepType::Prompt,
                duration_sec: Some(300),
            },
            DemoStep {
                title: "Close the circle",
                content: "Breathe out what you saw. It stays in the mirror.",
                step_type: StepType::Breath,
                duration_sec: Some(120),
            },
        ],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());

    let database = Database::new(&database_url)
        .await
        .context("Failed to initialize database")?;

    let existing = database
        .list_all_experiences()
        .await
        .context("Failed to inspect catalog")?;
    if !existing.is_empty() {
        info!(count = existing.len(), "Catalog already populated, nothing to seed");
        return Ok(());
    }

    for demo in DEMO_EXPERIENCES {
        let experience = database
            .create_experience(&NewExperience {
                title: demo.title.to_owned(),
                description: demo.description.to_owned(),
                status: Some(ExperienceStatus::Published),
                visibility: Some(demo.visibility),
                difficulty: Some(demo.difficulty),
                order_index: None,
                duration_min: Some(demo.duration_min),
                cover_emoji: Some(demo.cover_emoji.to_owned()),
            })
            .await
            .with_context(|| format!("Failed to seed experience: {}", demo.title))?;

        for (index, step) in demo.steps.iter().enumerate() {
            database
                .create_step(
                    experience.id,
                    &NewStep {
                        order_index: index as i64,
                        title: step.title.to_owned(),
                        content: step.content.to_owned(),
                        step_type: Some(step.step_type),
                        duration_sec: step.duration_sec,
                    },
                )
                .await
                .with_context(|| format!("Failed to seed step: {}", step.title))?;
        }

        info!(
            experience_id = %experience.id,
            steps = demo.steps.len(),
            "Seeded experience: {}",
            demo.title
        );
    }

    info!("Demo content seeding complete");
    Ok(())
}

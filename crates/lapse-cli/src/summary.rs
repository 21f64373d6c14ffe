use std::path::Path;

use console::Style;
use lapse_core::align::AlignmentSummary;
use lapse_core::pipeline::LapseConfig;
use lapse_core::sequence::Sequence;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    failed: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            failed: Style::new().red(),
        }
    }
}

fn seed_label(seed: Option<u64>) -> String {
    seed.map_or_else(|| "random".to_string(), |s| s.to_string())
}

pub fn print_align_summary(
    config: &LapseConfig,
    sequence: &Sequence,
    output: Option<&Path>,
    warped: Option<&Path>,
) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Lapse Alignment"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(sequence.len())
    );
    if let Some(reference) = sequence.reference() {
        println!(
            "  {:<14}{} ({})",
            s.label.apply_to("Reference"),
            s.path.apply_to(reference.path.display()),
            reference.original_size
        );
    }
    for (label, dir) in [("Output", output), ("Warped", warped)] {
        let value = match dir {
            Some(dir) => s.path.apply_to(dir.display().to_string()),
            None => s.disabled.apply_to("none".to_string()),
        };
        println!("  {:<14}{}", s.label.apply_to(label), value);
    }
    println!();

    println!("  {}", s.header.apply_to("Matching"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Height"),
        s.value.apply_to(format!("{} px", config.preprocess.height))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Keypoints"),
        s.value.apply_to(config.matching.max_keypoints)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Search"),
        s.value.apply_to(format!("{} px", config.matching.max_distance))
    );
    println!();

    println!("  {}", s.header.apply_to("RANSAC"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Trials"),
        s.value.apply_to(config.ransac.trials)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(format!("{} px", config.ransac.inlier_threshold))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Seed"),
        s.method.apply_to(seed_label(config.ransac.seed))
    );
    println!();

    println!("  {}", s.header.apply_to("Crop Search"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Population"),
        s.value.apply_to(config.optimizer.population_size)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Generations"),
        s.value.apply_to(config.optimizer.max_generations)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Seed"),
        s.method.apply_to(seed_label(config.optimizer.seed))
    );
    println!();
}

pub fn print_result_summary(sequence: &Sequence, summary: &AlignmentSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Aligned"),
        s.value.apply_to(format!("{}/{}", summary.aligned, sequence.len()))
    );
    if let Some(total) = summary.total_rect {
        println!("    {:<12}{}", s.label.apply_to("Total"), s.value.apply_to(total));
    }
    match summary.valid_rect {
        Some(valid) => {
            println!("    {:<12}{}", s.label.apply_to("Valid"), s.method.apply_to(valid))
        }
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Valid"),
            s.disabled.apply_to("empty")
        ),
    }

    if !summary.failed.is_empty() {
        println!();
        println!("  {}", s.header.apply_to("Failed Frames"));
        for (id, reason) in &summary.failed {
            let name = sequence
                .frame(*id)
                .map(|f| f.path.display().to_string())
                .unwrap_or_default();
            println!(
                "    {:<6}{} {}",
                s.label.apply_to(id),
                s.path.apply_to(name),
                s.failed.apply_to(reason)
            );
        }
    }
    println!();
}

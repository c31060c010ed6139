use console::Style;
use optred_core::pipeline::{MasterSource, ReductionConfig, ReductionSummary};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
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
        }
    }
}

pub fn print_reduction_summary(config: &ReductionConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Optical Reduction"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(17)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Inputs"),
        s.path.apply_to(config.inputs.join(" "))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Telescope"),
        s.method.apply_to(config.telescope)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.master_dir().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Overwrite"),
        s.value.apply_to(config.overwrite)
    );
    println!();

    println!("  {}", s.header.apply_to("Master Bias"));
    match config.master_bias {
        Some(ref path) => println!(
            "    {:<12}{}",
            s.label.apply_to("Supplied"),
            s.path.apply_to(path.display())
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Method"),
            s.method.apply_to(&config.bias.method)
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Master Flat"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(&config.flat.method)
    );
    for (filter, path) in &config.master_flats {
        println!(
            "    {:<12}{}",
            s.label.apply_to(filter),
            s.path.apply_to(path.display())
        );
    }
    println!();
}

fn print_master(s: &Styles, label: &str, source: &MasterSource) {
    let origin = match source {
        MasterSource::Combined { frames, .. } => format!("combined from {frames} frames"),
        MasterSource::Supplied(_) => "supplied".to_string(),
    };
    println!(
        "    {:<12}{} {}",
        s.label.apply_to(label),
        s.path.apply_to(source.path().display()),
        s.label.apply_to(format!("({origin})"))
    );
}

pub fn print_reduction_results(summary: &ReductionSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Frames"));
    for (label, count) in [
        ("Inspected", summary.inspected),
        ("Bias", summary.bias_frames),
        ("Dark", summary.dark_frames),
        ("Flat", summary.flat_frames),
        ("Object", summary.object_frames),
    ] {
        println!("    {:<12}{}", s.label.apply_to(label), s.value.apply_to(count));
    }
    if summary.dark_frames > 0 {
        println!(
            "    {:<12}{}",
            "",
            s.disabled.apply_to("dark frames are not used")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Masters"));
    if let Some(ref bias) = summary.master_bias {
        print_master(&s, "Bias", bias);
    }
    for filter in &summary.filters {
        print_master(&s, &filter.filter, &filter.master_flat);
    }
    for filter in &summary.skipped_filters {
        println!(
            "    {:<12}{}",
            s.label.apply_to(filter),
            s.disabled.apply_to("no flats, skipped")
        );
    }
    println!();

    let corrected: Vec<_> = summary.corrected().collect();
    println!(
        "  {} {}",
        s.header.apply_to("Corrected"),
        s.value.apply_to(corrected.len())
    );
    for path in corrected {
        println!("    {}", s.path.apply_to(path.display()));
    }

    if !summary.skipped_files.is_empty() {
        println!();
        println!("  {}", s.header.apply_to("Skipped Files"));
        for skipped in &summary.skipped_files {
            println!(
                "    {} {}",
                s.path.apply_to(skipped.path.display()),
                s.disabled.apply_to(&skipped.reason)
            );
        }
    }
    println!();
}

//! Terminal output for the pipeline rail and catalog.

use colored::{ColoredString, Colorize};
use pe_core::catalog::{BlockCatalog, Catalog};
use pe_core::editor::PipelineStore;
use pe_core::validation::validate_launch;
use pe_protocol::block_models::{Block, BlockKind};

fn kind_label(kind: BlockKind) -> ColoredString {
    let label = kind.to_string();
    match kind {
        BlockKind::Condition => label.magenta(),
        BlockKind::Action => label.blue(),
        BlockKind::Integration => label.cyan(),
        BlockKind::Reference => label.white(),
        BlockKind::ConditionEndMarker | BlockKind::Placeholder => label.dimmed(),
    }
}

pub fn print_catalog(catalog: &Catalog, kind: Option<BlockKind>) {
    for entry in catalog.entries() {
        if kind.is_some_and(|k| k != entry.kind) {
            continue;
        }
        println!(
            "{:<14} {:<32} {}",
            kind_label(entry.kind),
            entry.subtype.bold(),
            entry.label
        );
    }
}

/// Print the rail with condition bodies indented, followed by status lines.
pub fn print_store(store: &PipelineStore) {
    if store.blocks().is_empty() {
        println!("{}", "(empty pipeline)".dimmed());
    }

    let mut depth = 0usize;
    for (index, block) in store.blocks().iter().enumerate() {
        if block.is_end_marker() {
            depth = depth.saturating_sub(1);
        }
        println!("{:>3}  {}{}", index, "  ".repeat(depth), describe(block));
        if block.is_condition() {
            depth += 1;
        }
    }

    println!();
    match validate_launch(store.blocks()) {
        Ok(()) => println!("{} {}", "launch:".bold(), "ready".green()),
        Err(e) => println!("{} {}", "launch:".bold(), e.to_string().red()),
    }
    println!(
        "{} undo {}, redo {}",
        "history:".bold(),
        yes_no(store.can_undo()),
        yes_no(store.can_redo())
    );
    let viewport = store.viewport();
    println!(
        "{} zoom {:.0}%, offset ({}, {})",
        "viewport:".bold(),
        viewport.zoom * 100.0,
        viewport.offset.x,
        viewport.offset.y
    );
}

fn describe(block: &Block) -> String {
    match block.kind {
        BlockKind::Placeholder => format!("{}", "[ + choose a block ]".yellow()),
        BlockKind::ConditionEndMarker => format!("{}", block.title.dimmed()),
        _ => format!(
            "{} {} {}",
            kind_label(block.kind),
            block.title.bold(),
            format!("({})", block.id).dimmed()
        ),
    }
}

fn yes_no(value: bool) -> ColoredString {
    if value {
        "yes".green()
    } else {
        "no".dimmed()
    }
}

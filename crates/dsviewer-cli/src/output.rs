use std::io::Write;

use dsviewer_core::{Block, Message, MultimodalRecord, RenderPlan, Role, WordCloud};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

pub fn print_error(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "ERROR:".red().bold(), message)
    } else {
        writeln!(w, "ERROR: {}", message)
    }
}

pub fn print_warning(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), message)
    } else {
        writeln!(w, "WARNING: {}", message)
    }
}

fn print_label(w: &mut dyn Write, label: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        write!(w, "{}", label.bold())
    } else {
        write!(w, "{}", label)
    }
}

/// Print every content block of a render plan. Errors and warnings go to
/// `err`, everything else to `w`.
pub fn print_plan(
    w: &mut dyn Write,
    err: &mut dyn Write,
    plan: &RenderPlan,
    color: ColorMode,
) -> std::io::Result<()> {
    for block in &plan.blocks {
        match block {
            Block::Title(_) => {}
            Block::Error(msg) => print_error(err, msg, color)?,
            Block::Warning(msg) => print_warning(err, msg, color)?,
            Block::DatasetSize { len, total_rows } => {
                print_label(w, "Dataset Size: ", color)?;
                if total_rows > len {
                    writeln!(w, "{} (first {} of {} rows)", len, len, total_rows)?;
                } else {
                    writeln!(w, "{}", len)?;
                }
            }
            Block::Keys(keys) => {
                print_label(w, "Dataset Keys: ", color)?;
                writeln!(w, "{:?}", keys)?;
            }
            Block::Context(context) => {
                writeln!(w)?;
                print_label(w, "Context", color)?;
                writeln!(w)?;
                writeln!(w, "{}", context)?;
                writeln!(w, "---")?;
            }
            Block::Options(options) => {
                print_label(w, "Options:", color)?;
                writeln!(w)?;
                for opt in options {
                    writeln!(w, "  {}", opt)?;
                }
            }
            Block::Chat(message) => print_message(w, message, color)?,
            Block::WordCloud(cloud) => print_top_words(w, cloud, 20, color)?,
            Block::Fields(record) => print_fields(w, record, color)?,
            Block::Image { path, .. } => {
                print_label(w, "Image: ", color)?;
                writeln!(w, "{}", path.display())?;
            }
        }
    }
    Ok(())
}

fn print_message(w: &mut dyn Write, message: &Message, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    let role = message.role.as_str();
    if color.enabled() {
        match message.role {
            Role::User => writeln!(w, "{} {}", message.avatar, role.cyan().bold())?,
            Role::Robot => writeln!(w, "{} {}", message.avatar, role.green().bold())?,
        }
    } else {
        writeln!(w, "{} {}", message.avatar, role)?;
    }
    for line in message.content.lines() {
        writeln!(w, "  {}", line)?;
    }
    Ok(())
}

fn print_fields(w: &mut dyn Write, record: &MultimodalRecord, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    let rows = record
        .text_fields
        .iter()
        .cloned()
        .chain(record.images.iter().map(|img| {
            let size = match (img.width, img.height) {
                (Some(wd), Some(ht)) => format!(" ({}x{})", wd, ht),
                _ => String::new(),
            };
            (img.field.clone(), format!("{}{}", img.location, size))
        }))
        .chain(record.other_fields.iter().cloned());
    for (name, value) in rows {
        if color.enabled() {
            writeln!(w, "{}: {}", name.cyan(), value)?;
        } else {
            writeln!(w, "{}: {}", name, value)?;
        }
    }
    Ok(())
}

/// The `limit` most frequent placed words, one per line.
pub fn print_top_words(
    w: &mut dyn Write,
    cloud: &WordCloud,
    limit: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    print_label(w, "Word cloud: ", color)?;
    writeln!(w, "{} words placed on {}x{}", cloud.words.len(), cloud.width, cloud.height)?;
    for word in cloud.words.iter().take(limit) {
        let bar = "#".repeat(((word.weight * 20.0).round() as usize).max(1));
        if color.enabled() {
            let (r, g, b) = word.color();
            writeln!(
                w,
                "  {:<20} {:>6}  {}",
                word.text,
                word.count,
                bar.truecolor(r, g, b)
            )?;
        } else {
            writeln!(w, "  {:<20} {:>6}  {}", word.text, word.count, bar)?;
        }
    }
    Ok(())
}

pub fn print_list(
    w: &mut dyn Write,
    items: &[String],
    selected: Option<usize>,
    color: ColorMode,
) -> std::io::Result<()> {
    for (i, item) in items.iter().enumerate() {
        let marker = if Some(i) == selected { "*" } else { " " };
        if color.enabled() && Some(i) == selected {
            writeln!(w, "{} {}", marker.green(), item.green())?;
        } else {
            writeln!(w, "{} {}", marker, item)?;
        }
    }
    Ok(())
}

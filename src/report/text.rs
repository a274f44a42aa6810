use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use super::{fmt_float, fmt_int};
use crate::analysis::Distribution;
use crate::data::schema::Column;
use crate::summary::DatasetSummary;

const RULE_WIDTH: usize = 80;

pub fn write(path: &Path, summary: &DatasetSummary) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {} failed", path.display()))?;
    let mut w = BufWriter::new(file);
    write_report(&mut w, summary)?;
    w.flush()?;
    Ok(())
}

/// Fixed-width report, sections in a stable order.
pub fn write_report<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w, "DNA Dataset Summary Report")?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w)?;

    overview(w, s)?;
    variables(w, s)?;
    labels(w, s)?;
    group_methods(w, s)?;
    sequences(w, s)?;
    leakage(w, s)?;
    imbalance(w, s)?;
    sample(w, s)?;
    closing(w, s)?;
    Ok(())
}

fn banner<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w, "{title}")?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(w)
}

fn no_rows<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "(no rows)")?;
    writeln!(w)
}

fn overview<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "1. Dataset Overview")?;
    writeln!(w, "{:<20} | {:<15} | {:<15}", "File", "Rows", "Columns")?;
    writeln!(w, "{}", "-".repeat(60))?;
    for f in &s.files {
        writeln!(w, "{:<20} | {:<15} | {:<15}", f.file, fmt_int(f.rows), f.columns)?;
    }
    writeln!(w, "{}", "-".repeat(60))?;
    writeln!(w, "{:<20} | {:<15} |", "Total", fmt_int(s.total_rows))?;
    writeln!(w)?;

    // Columns beyond the known schema, per file.
    for f in &s.files {
        let extra: Vec<&str> = f
            .column_names
            .iter()
            .map(String::as_str)
            .filter(|name| {
                !Column::REQUIRED
                    .iter()
                    .any(|c| c.matches_header(name))
            })
            .filter(|name| !name.is_empty())
            .collect();
        if !extra.is_empty() {
            writeln!(w, "Other columns in {}: {}", f.file, extra.join(", "))?;
        }
    }
    writeln!(w)
}

fn variables<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "2. Variables (Columns)")?;
    writeln!(w, "Number of variables: {}", s.profiles.len())?;
    writeln!(w)?;
    for (i, p) in s.profiles.iter().enumerate() {
        writeln!(w, "{}. {}", i + 1, p.column)?;
        writeln!(w, "   Present values: {}", fmt_int(p.present))?;
        writeln!(w, "   Unique values: {}", fmt_int(p.distinct))?;
        writeln!(w, "   Missing values: {}", fmt_int(p.missing))?;
        writeln!(w)?;
    }
    Ok(())
}

fn distribution_table<W: Write>(w: &mut W, heading: &str, dist: &Distribution) -> io::Result<()> {
    if dist.is_empty() {
        return no_rows(w);
    }
    writeln!(w, "{:<30} | {:<12} | {:<10}", heading, "Count", "Percent")?;
    writeln!(w, "{}", "-".repeat(60))?;
    for e in &dist.entries {
        writeln!(
            w,
            "{:<30} | {:<12} | {:<10}%",
            e.label,
            fmt_int(e.count),
            format!("{:.2}", e.percent)
        )?;
    }
    writeln!(w, "{}", "-".repeat(60))?;
    writeln!(
        w,
        "{:<30} | {:<12} | {:<10}%",
        "Total",
        fmt_int(dist.total),
        format!("{:.2}", dist.percent_sum())
    )?;
    writeln!(w)
}

fn labels<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    let column = s.label_column.header();
    banner(w, &format!("3. Label Analysis ({column})"))?;
    writeln!(w, "Label distribution across all data:")?;
    writeln!(w)?;
    distribution_table(w, column, &s.labels)?;

    writeln!(w, "Label distribution by file:")?;
    writeln!(w)?;
    let split = &s.labels_by_partition;
    if split.is_empty() || split.labels.is_empty() {
        return no_rows(w);
    }
    let mut header = format!("{:<25}", column);
    for b in &split.partitions {
        header.push_str(&format!(" | {:<15}", b.partition.title()));
    }
    writeln!(w, "{header}")?;
    writeln!(w, "{}", "-".repeat(25 + 18 * split.partitions.len()))?;
    for (col, label) in split.labels.iter().enumerate() {
        let mut row = format!("{:<25}", label);
        for b in &split.partitions {
            row.push_str(&format!(" | {:<15}", fmt_int(b.counts[col])));
        }
        writeln!(w, "{row}")?;
    }
    let mut totals = format!("{:<25}", "Rows");
    for b in &split.partitions {
        totals.push_str(&format!(
            " | {:<15}",
            format!("{} ({:.1}%)", fmt_int(b.rows), b.share)
        ));
    }
    writeln!(w, "{}", "-".repeat(25 + 18 * split.partitions.len()))?;
    writeln!(w, "{totals}")?;
    writeln!(w)
}

fn group_methods<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "4. GeneGroupMethod Analysis")?;
    distribution_table(w, "GeneGroupMethod", &s.group_methods)
}

fn sequences<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "5. DNA Sequence Analysis")?;
    writeln!(w, "Sequence length statistics:")?;
    writeln!(w)?;
    match &s.sequence_length {
        Some(len) => {
            writeln!(w, "  Min length:     {}", fmt_float(len.min, 0))?;
            writeln!(w, "  Max length:     {}", fmt_float(len.max, 0))?;
            writeln!(w, "  Mean length:    {}", fmt_float(len.mean, 2))?;
            writeln!(w, "  Median length:  {}", fmt_float(len.median, 0))?;
            writeln!(w, "  Std deviation:  {}", fmt_float(len.std, 2))?;
            writeln!(w)?;
        }
        None => no_rows(w)?,
    }

    writeln!(w, "Sequence length by {}:", s.label_column.header())?;
    writeln!(w)?;
    if s.length_by_label.is_empty() {
        no_rows(w)?;
    } else {
        writeln!(
            w,
            "{:<25} | {:<10} | {:<10} | {:<10} | {:<8} | {:<10} | {:<10}",
            s.label_column.header(),
            "Mean",
            "Median",
            "Std",
            "Min",
            "Max",
            "Count"
        )?;
        writeln!(w, "{}", "-".repeat(100))?;
        for g in &s.length_by_label.groups {
            writeln!(
                w,
                "{:<25} | {:<10} | {:<10} | {:<10} | {:<8} | {:<10} | {:<10}",
                g.label,
                format!("{:.1}", g.stats.mean),
                format!("{:.1}", g.stats.median),
                format!("{:.1}", g.stats.std),
                format!("{:.0}", g.stats.min),
                format!("{:.0}", g.stats.max),
                fmt_int(g.stats.count)
            )?;
        }
        writeln!(w)?;
    }

    writeln!(w, "GC content statistics:")?;
    writeln!(w)?;
    match &s.gc_fraction {
        Some(gc) => {
            writeln!(w, "  Mean GC:    {:.2}%", gc.mean * 100.0)?;
            writeln!(w, "  Median GC:  {:.2}%", gc.median * 100.0)?;
            writeln!(w, "  Std GC:     {:.2}%", gc.std * 100.0)?;
            writeln!(w, "  Min GC:     {:.2}%", gc.min * 100.0)?;
            writeln!(w, "  Max GC:     {:.2}%", gc.max * 100.0)?;
            writeln!(w)?;
        }
        None => no_rows(w)?,
    }

    writeln!(w, "Mean nucleotide composition:")?;
    writeln!(w)?;
    match &s.composition {
        Some(c) => {
            writeln!(w, "  Sequences:  {}", fmt_int(c.sequences))?;
            writeln!(w, "  A:          {:.2}%", c.a * 100.0)?;
            writeln!(w, "  T:          {:.2}%", c.t * 100.0)?;
            writeln!(w, "  G:          {:.2}%", c.g * 100.0)?;
            writeln!(w, "  C:          {:.2}%", c.c * 100.0)?;
            writeln!(w, "  GC:         {:.2}%", c.gc * 100.0)?;
            writeln!(w)
        }
        None => no_rows(w),
    }
}

fn leakage<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "6. Data Leakage")?;
    if s.sequence_overlap.is_empty() {
        writeln!(w, "Fewer than two partitions loaded.")?;
        return writeln!(w);
    }
    writeln!(
        w,
        "{:<25} | {:<15} | {:<15} | {:<15}",
        "Partitions", "Shared", "Distinct (2nd)", "Leaked (2nd)"
    )?;
    writeln!(w, "{}", "-".repeat(80))?;
    for o in &s.sequence_overlap {
        writeln!(
            w,
            "{:<25} | {:<15} | {:<15} | {:<15}",
            format!("{} / {}", o.first.title(), o.second.title()),
            fmt_int(o.shared),
            fmt_int(o.second_distinct),
            format!("{:.2}%", o.second_leak_fraction() * 100.0)
        )?;
    }
    writeln!(w)?;
    writeln!(
        w,
        "Sequences present in more than one partition: {}",
        fmt_int(s.leaked_sequences)
    )?;
    writeln!(w)
}

fn imbalance<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "7. Class Imbalance")?;
    if s.recognized_labels.is_empty() {
        return no_rows(w);
    }
    writeln!(w, "{:<25} | {:<12} | {:<10}", s.label_column.header(), "Count", "Ratio")?;
    writeln!(w, "{}", "-".repeat(55))?;
    for (entry, (_, ratio)) in s.recognized_labels.entries.iter().zip(&s.imbalance) {
        writeln!(
            w,
            "{:<25} | {:<12} | {:<10}",
            entry.label,
            fmt_int(entry.count),
            format!("{:.1}x", ratio)
        )?;
    }
    writeln!(w)
}

fn sample<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "8. Sample Data")?;
    writeln!(w, "First {} rows from the train partition:", s.sample.len())?;
    writeln!(w)?;
    if s.sample.is_empty() {
        return no_rows(w);
    }
    let cell = |v: &Option<String>| v.clone().unwrap_or_else(|| "NaN".to_string());
    for row in &s.sample {
        writeln!(w, "[{}]", row.row_id.as_deref().unwrap_or("-"))?;
        writeln!(w, "  NucleotideSequence: {}", cell(&row.sequence))?;
        writeln!(w, "  Symbol:             {}", cell(&row.symbol))?;
        writeln!(w, "  GeneType:           {}", cell(&row.gene_type))?;
        writeln!(w, "  GeneGroupMethod:    {}", cell(&row.gene_group_method))?;
        writeln!(w, "  Description:        {}", cell(&row.description))?;
    }
    writeln!(w)
}

fn closing<W: Write>(w: &mut W, s: &DatasetSummary) -> io::Result<()> {
    banner(w, "Summary")?;
    writeln!(w, "* Total samples: {}", fmt_int(s.total_rows))?;
    writeln!(w, "* Number of labels: {}", s.labels.len())?;
    writeln!(
        w,
        "* Most common label: {}",
        s.most_common_label().unwrap_or("(none)")
    )?;
    match &s.sequence_length {
        Some(len) => writeln!(w, "* Average sequence length: {:.0}", len.mean)?,
        None => writeln!(w, "* Average sequence length: (no rows)")?,
    }
    writeln!(w)?;
    writeln!(w, "{}", "=".repeat(RULE_WIDTH))
}

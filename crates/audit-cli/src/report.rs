use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use audit_engine::AuditReport;
use bstr::BStr;

/// First line of human output, written before the audit starts.
pub fn write_root(root: &Path, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", root.display())?;
    Ok(())
}

/// One untracked path, in `git rm` style. Written as each removal happens.
pub fn write_removal(path: &BStr, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "rm '{path}'")?;
    out.flush()
}

/// Unmanaged extensions in sorted order.
pub fn write_unmanaged(report: &AuditReport, out: &mut impl Write) -> Result<()> {
    for ext in &report.unmanaged {
        writeln!(out, "unmanaged: {ext}")?;
    }
    Ok(())
}

pub fn write_json(report: &AuditReport, out: &mut impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

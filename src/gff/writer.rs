//! Serializes the header block and nine-column data lines.
//!
//! No validation happens here; the writer trusts the synthesizer's
//! invariants and appends records in the order they arrive.

use chrono::{DateTime, Local};
use std::io::Write;

use super::{OutputRecord, PLACEHOLDER};

/// Provenance stanza for one provider source file
#[derive(Debug, Clone)]
pub struct ProviderProvenance {
    /// Stanza heading, e.g. `ensembl regulatory build`
    pub heading: String,
    /// Source file name, without compression extension
    pub file: String,
    pub url: String,
    /// Modification timestamp of the file that was used
    pub timestamp: String,
}

/// Everything stamped into the file-level header block
#[derive(Debug, Clone)]
pub struct Provenance {
    pub file_name: String,
    pub generated: DateTime<Local>,
    pub taxon_id: u32,
    pub genome_build: String,
    pub providers: Vec<ProviderProvenance>,
}

pub struct GffWriter<W: Write> {
    out: W,
    records: u64,
}

impl<W: Write> GffWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, records: 0 }
    }

    /// Write the header block. Called once, before any record.
    pub fn write_header(&mut self, provenance: &Provenance) -> crate::Result<()> {
        let mut header = format!(
            "##gff-version 3\n\
             #\n\
             # {}\n\
             # Date: {}\n\
             # Taxonid: {}\n\
             # Genome build: {}\n\
             #\n\
             # This file is generated by combining information from multiple sources.\n\
             # Regulatory features and genome coordinates are obtained from VISTA, the Ensembl Regulatory Build & the NCBI Regulatory Build.\n\
             # Coordinates are transformed to the target genome build upstream where necessary.\n\
             # Nomenclature, identifiers, and cross references come from the curated marker catalog. Provider representations of regulatory\n\
             # features are preserved, with no attempt to identify regulatory feature equivalence between providers.\n\
             #\n\
             # The following lists information about the regulatory feature providers: the file, its modification date, and its URL\n\
             #\n",
            provenance.file_name,
            provenance.generated.format("%m/%d/%Y %H:%M:%S"),
            provenance.taxon_id,
            provenance.genome_build,
        );
        for p in &provenance.providers {
            header.push_str(&format!(
                "# ----------------------------------\n\
                 #\n\
                 # {}\n\
                 # File: {}\n\
                 # File url: {}\n\
                 # File date used: {}\n\
                 #\n",
                p.heading, p.file, p.url, p.timestamp
            ));
        }
        self.out.write_all(header.as_bytes())?;
        Ok(())
    }

    /// Append one nine-column tab-separated data line
    pub fn write_record(&mut self, record: &OutputRecord) -> crate::Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.chromosome,
            record.source,
            record.feature_term,
            record.start,
            record.end,
            PLACEHOLDER,
            record.strand.as_gff(),
            PLACEHOLDER,
            record.attributes.encode()
        )?;
        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> crate::Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

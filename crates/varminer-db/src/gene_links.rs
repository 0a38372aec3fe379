//! "See also" links between multi-gene groupings and their member genes.
//!
//! A small variant touching several genes is stored under a combined symbol
//! such as `BRCA1, NBR2`. Each member that also occurs on its own is linked
//! to the grouping and back, so a gene page can point at the grouping.

use crate::error::Result;
use crate::schema::{TABLE_GENE_LINKS, TABLE_NORMALIZED_GENE_LINKS};
use rusqlite::{params, Connection};
use tracing::debug;
use varminer_common::GeneMultiplicity;

/// Rebuild `gene_links` and `normalized_gene_links` for `date`; returns the
/// number of grouping → member links (each is also stored reversed).
pub fn rebuild_gene_links(conn: &Connection, date: &str) -> Result<usize> {
    let mut total = 0;
    for (table, gene_col, type_col) in [
        (TABLE_GENE_LINKS, "gene", "gene_type"),
        (TABLE_NORMALIZED_GENE_LINKS, "normalized_gene", "normalized_gene_type"),
    ] {
        conn.execute(&format!("DELETE FROM {table}"), [])?;

        let forward = format!(
            "INSERT OR IGNORE INTO {table} (gene, see_also)
             SELECT DISTINCT multi.{gene_col}, single.{gene_col}
             FROM submissions AS multi
             JOIN submissions AS single
               ON single.date = multi.date
              AND single.{type_col} = ?2
              AND instr(', ' || multi.{gene_col} || ', ', ', ' || single.{gene_col} || ', ') > 0
             WHERE multi.date = ?1 AND multi.{type_col} = ?3"
        );
        let single = GeneMultiplicity::SingleGene.code();
        let overlapping = GeneMultiplicity::OverlappingGenes.code();
        let n = conn.execute(&forward, params![date, single, overlapping])?;
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {table} (gene, see_also) SELECT see_also, gene FROM {table}"
            ),
            [],
        )?;
        debug!(table, links = n, "gene links rebuilt");
        total += n;
    }
    Ok(total)
}

/// Genes linked from `gene`, sorted.
pub fn see_also(conn: &Connection, table: &str, gene: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT see_also FROM {table} WHERE gene = ?1 ORDER BY see_also"
    ))?;
    let rows = stmt.query_map(params![gene], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

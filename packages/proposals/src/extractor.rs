//! Record extraction from SAPL listing pages.
//!
//! The listing is a striped table where each row is one proposal:
//!
//! - first cell: `<b><a>IND 101/2024 - Indicação</a></b>` followed by a
//!   `<div>` holding protocol info (`Protocolo: 1234/2024 de 10/01/2024 ...`)
//! - second cell: a `<p class="mb-0">` whose `<b>Ementa:</b>` label is
//!   followed by the description text node, and which contains a
//!   `.texto-original` link to the original document
//!
//! These selection rules are the only coupling to the upstream markup.
//! Rows missing a required field are dropped with a warning; a malformed
//! row never fails the page.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::types::proposal::RawProposal;

lazy_static! {
    static ref ROW: Selector = selector("table.table-striped tbody tr");
    static ref ID_LINK: Selector = selector("td:nth-child(1) > b > a");
    static ref PROTOCOL_INFO: Selector = selector("td:nth-child(1) > div");
    static ref DETAILS: Selector = selector("td:nth-child(2) > p.mb-0");
    static ref DOCUMENT_LINK: Selector = selector(".texto-original a");
    static ref ID_PATTERN: Regex = Regex::new(r"IND\s+(\d+/\d+)").unwrap();
    static ref DATE_PATTERN: Regex = Regex::new(r"\b(\d{2}/\d{2}/(\d{4}))\b").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const EMENTA_LABEL: &str = "Ementa:";

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Why a listing row was not turned into a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("no identifier link in first cell")]
    MissingIdentifier,

    #[error("no dd/mm/yyyy protocol date")]
    MissingProtocolDate,

    #[error("no description paragraph")]
    MissingDetails,

    #[error("no text after the Ementa label")]
    MissingDescription,

    #[error("no original document link")]
    MissingDocumentLink,

    #[error("document link {href:?} cannot be resolved")]
    InvalidDocumentLink { href: String },
}

/// Parse every proposal row of a listing page.
///
/// Returns an empty list for markup with no matching rows, including the
/// empty string.
pub fn parse_proposals(markup: &str, base_url: &Url) -> Vec<RawProposal> {
    if markup.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(markup);
    let mut proposals = Vec::new();

    for (index, row) in document.select(&ROW).enumerate() {
        match parse_row(row, base_url) {
            Ok(proposal) => {
                debug!(row = index, id = %proposal.id, "Parsed proposal row");
                proposals.push(proposal);
            }
            Err(reason) => {
                warn!(row = index, reason = %reason, "Skipping malformed proposal row");
            }
        }
    }

    proposals
}

/// Parse a single table row.
pub fn parse_row(row: ElementRef<'_>, base_url: &Url) -> Result<RawProposal, RowRejection> {
    let id_text = row
        .select(&ID_LINK)
        .next()
        .map(trimmed_text)
        .filter(|text| !text.is_empty())
        .ok_or(RowRejection::MissingIdentifier)?;

    let (protocol_date, year) = row
        .select(&PROTOCOL_INFO)
        .next()
        .map(element_text)
        .as_deref()
        .and_then(protocol_date)
        .ok_or(RowRejection::MissingProtocolDate)?;

    let details = row
        .select(&DETAILS)
        .next()
        .ok_or(RowRejection::MissingDetails)?;

    let description = ementa(details).ok_or(RowRejection::MissingDescription)?;

    let href = details
        .select(&DOCUMENT_LINK)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or(RowRejection::MissingDocumentLink)?;

    let pdf_url = base_url
        .join(href)
        .map_err(|_| RowRejection::InvalidDocumentLink {
            href: href.to_string(),
        })?;

    Ok(RawProposal {
        id: normalize_id(&id_text),
        title: id_text,
        description,
        protocol_date,
        year,
        pdf_url: pdf_url.to_string(),
    })
}

/// `IND <number>/<year>` when the pattern matches, the raw text otherwise.
pub fn normalize_id(id_text: &str) -> String {
    match ID_PATTERN.captures(id_text) {
        Some(caps) => format!("IND {}", &caps[1]),
        None => id_text.to_string(),
    }
}

/// First `dd/mm/yyyy` in the protocol cell, with its year.
fn protocol_date(protocol_text: &str) -> Option<(String, i32)> {
    let caps = DATE_PATTERN.captures(protocol_text)?;
    let year = caps[2].parse().ok()?;
    Some((caps[1].to_string(), year))
}

/// Text node immediately following the `<b>Ementa:</b>` label.
fn ementa(details: ElementRef<'_>) -> Option<String> {
    let label = details.children().find(|node| {
        ElementRef::wrap(*node).is_some_and(|el| {
            el.value().name() == "b" && element_text(el) == EMENTA_LABEL
        })
    })?;

    let text = label.next_sibling()?.value().as_text()?;
    let description = text.trim();
    (!description.is_empty()).then(|| description.to_string())
}

/// Element text trimmed at the ends only; inner spacing is kept.
fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://sapl.example.gov.br").unwrap()
    }

    fn row(id: &str, protocol: &str, details: &str) -> String {
        format!(
            r#"<tr>
                <td><b><a href="/materia/1">{id}</a></b><div>{protocol}</div></td>
                <td><p class="mb-0">{details}</p></td>
            </tr>"#
        )
    }

    fn details(ementa: &str, href: &str) -> String {
        format!(
            r#"<b>Autor:</b> Vereador<br><b>Ementa:</b> {ementa}<br>
               <span class="texto-original"><a href="{href}">Texto Original</a></span>"#
        )
    }

    fn table(rows: &[String]) -> String {
        format!(
            r#"<html><body><table class="table table-striped"><tbody>{}</tbody></table></body></html>"#,
            rows.join("\n")
        )
    }

    #[test]
    fn test_parses_complete_row() {
        let html = table(&[row(
            "IND 101/2024 - Indicação",
            "Protocolo: 1234/2024 de 10/01/2024 - 09:15",
            &details(
                "Solicita a troca de lâmpadas na Rua Marechal Deodoro.",
                "/media/ind_101.pdf",
            ),
        )]);

        let proposals = parse_proposals(&html, &base());

        assert_eq!(proposals.len(), 1);
        let p = &proposals[0];
        assert_eq!(p.id, "IND 101/2024");
        assert_eq!(p.title, "IND 101/2024 - Indicação");
        assert_eq!(
            p.description,
            "Solicita a troca de lâmpadas na Rua Marechal Deodoro."
        );
        assert_eq!(p.protocol_date, "10/01/2024");
        assert_eq!(p.year, 2024);
        assert_eq!(p.pdf_url, "https://sapl.example.gov.br/media/ind_101.pdf");
    }

    #[test]
    fn test_unmatched_identifier_used_verbatim() {
        let html = table(&[row(
            "  PL   12 /2024  ",
            "Protocolo: de 02/02/2024",
            &details("  Algo com   espaços.  ", "https://cdn.example.com/a.pdf"),
        )]);

        let proposals = parse_proposals(&html, &base());

        assert_eq!(proposals[0].id, "PL   12 /2024");
        assert_eq!(proposals[0].title, "PL   12 /2024");
        assert_eq!(proposals[0].description, "Algo com   espaços.");
        assert_eq!(proposals[0].pdf_url, "https://cdn.example.com/a.pdf");
    }

    #[test]
    fn test_ids_differing_in_inner_spacing_stay_distinct() {
        let html = table(&[
            row("PL 12/2024", "Protocolo: de 02/02/2024", &details("A.", "/a.pdf")),
            row("PL  12/2024", "Protocolo: de 03/02/2024", &details("B.", "/b.pdf")),
        ]);

        let proposals = parse_proposals(&html, &base());

        assert_eq!(proposals.len(), 2);
        assert_ne!(proposals[0].id, proposals[1].id);
    }

    #[test]
    fn test_malformed_rows_dropped_siblings_kept() {
        let good = row(
            "IND 1/2024",
            "Protocolo: 1/2024 de 01/01/2024",
            &details("Ementa válida.", "/a.pdf"),
        );
        let no_date = row(
            "IND 2/2024",
            "Protocolo: pendente",
            &details("Sem data.", "/b.pdf"),
        );
        let no_ementa = row(
            "IND 3/2024",
            "Protocolo: 3/2024 de 03/01/2024",
            r#"<b>Autor:</b> Vereador<span class="texto-original"><a href="/c.pdf">x</a></span>"#,
        );
        let empty_ementa = row(
            "IND 4/2024",
            "Protocolo: 4/2024 de 04/01/2024",
            &details("   ", "/d.pdf"),
        );
        let no_link = row(
            "IND 5/2024",
            "Protocolo: 5/2024 de 05/01/2024",
            "<b>Ementa:</b> Sem documento.",
        );
        let also_good = row(
            "IND 6/2024",
            "Protocolo: 6/2024 de 06/01/2024",
            &details("Outra ementa.", "/f.pdf"),
        );

        let html = table(&[good, no_date, no_ementa, empty_ementa, no_link, also_good]);
        let proposals = parse_proposals(&html, &base());

        let ids: Vec<_> = proposals.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["IND 1/2024", "IND 6/2024"]);
    }

    #[test]
    fn test_row_rejection_reasons() {
        let html = table(&[row(
            "IND 9/2024",
            "Protocolo: 9/2024 de 09/01/2024",
            "<b>Ementa:</b> Sem documento.",
        )]);
        let document = Html::parse_document(&html);
        let tr = document.select(&ROW).next().unwrap();

        assert_eq!(
            parse_row(tr, &base()),
            Err(RowRejection::MissingDocumentLink)
        );
    }

    #[test]
    fn test_no_rows_is_empty_not_error() {
        assert!(parse_proposals("", &base()).is_empty());
        assert!(parse_proposals("<html><body><p>Nada</p></body></html>", &base()).is_empty());
        assert!(parse_proposals(
            r#"<table class="table"><tr><td>not striped</td></tr></table>"#,
            &base()
        )
        .is_empty());
    }

    #[test]
    fn test_tolerates_extra_whitespace_and_implicit_tbody() {
        let html = r#"
            <table class="table table-striped table-hover">
              <tr>
                <td>
                  <b>
                    <a href="/materia/77">
                      IND   77/2024
                    </a>
                  </b>
                  <div>
                    Protocolo:   77/2024 de   15/05/2024
                  </div>
                </td>
                <td>
                  <p class="mb-0">
                    <b> Ementa: </b>
                      Solicita   poda de árvores
                      na Praça Centenário.
                    <span class="texto-original">
                      <a href=" /media/77.pdf ">Texto Original</a>
                    </span>
                  </p>
                </td>
              </tr>
            </table>"#;

        let proposals = parse_proposals(html, &base());

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, "IND 77/2024");
        assert_eq!(proposals[0].title, "IND   77/2024");
        let description = &proposals[0].description;
        assert!(description.starts_with("Solicita   poda de árvores\n"));
        assert!(description.ends_with("na Praça Centenário."));
        assert_eq!(proposals[0].protocol_date, "15/05/2024");
        assert_eq!(proposals[0].pdf_url, "https://sapl.example.gov.br/media/77.pdf");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("IND 12/2024 - Indicação"), "IND 12/2024");
        assert_eq!(normalize_id("PL 12/2024"), "PL 12/2024");
    }
}

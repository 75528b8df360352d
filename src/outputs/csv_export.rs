//! CSV export.
//!
//! | File | Header |
//! |------|--------|
//! | job listings | `titulo,empresa,descricao,data_publicacao,salario,localizacao` |
//! | single enriched job | `key,value` |
//! | zone statistics | `Zona,Tipo de Trabalho,Nº de vagas` |
//! | skill / tag ranking | `skill,count` |

use crate::error::Result;
use crate::models::{NormalizedJob, RawRecord, SkillCount, ZoneTypeCount};
use crate::utils::value_to_text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// One line of the job-listing export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRow {
    pub titulo: String,
    pub empresa: String,
    pub descricao: String,
    pub data_publicacao: String,
    pub salario: String,
    pub localizacao: String,
}

impl From<&NormalizedJob> for JobRow {
    fn from(job: &NormalizedJob) -> Self {
        Self {
            titulo: job.title.clone(),
            empresa: job.company_name.clone(),
            descricao: job.description.clone(),
            data_publicacao: job
                .publication_date
                .map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_default(),
            salario: job.salary_text.clone(),
            localizacao: job.location_names.join(", "),
        }
    }
}

/// A writer that has already emitted `header`.
///
/// Rows are then serialized without serde adding a header of its own, so an
/// empty export still carries the header line.
fn headed_writer<W: Write>(out: W, header: &[&str]) -> Result<csv::Writer<W>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(header)?;
    Ok(writer)
}

pub fn write_jobs<W: Write>(out: W, jobs: &[NormalizedJob]) -> Result<()> {
    let mut writer = headed_writer(
        out,
        &["titulo", "empresa", "descricao", "data_publicacao", "salario", "localizacao"],
    )?;
    for job in jobs {
        writer.serialize(JobRow::from(job))?;
    }
    writer.flush()?;
    Ok(())
}

/// `key,value` rows; nested values are written as compact JSON.
pub fn write_key_values<W: Write>(out: W, record: &RawRecord) -> Result<()> {
    let mut writer = headed_writer(out, &["key", "value"])?;
    for (key, value) in record {
        writer.write_record([key.as_str(), value_to_text(value).as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_zone_counts<W: Write>(out: W, rows: &[ZoneTypeCount]) -> Result<()> {
    let mut writer = headed_writer(out, &["Zona", "Tipo de Trabalho", "Nº de vagas"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_skill_counts<W: Write>(out: W, rows: &[SkillCount]) -> Result<()> {
    let mut writer = headed_writer(out, &["skill", "count"])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Create `path` and run `write` against it.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn export<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(std::io::BufWriter<std::fs::File>) -> Result<()>,
{
    let file = std::fs::File::create(path.as_ref())?;
    write(std::io::BufWriter::new(file))?;
    info!("Wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn jobs() -> Vec<NormalizedJob> {
        vec![
            NormalizedJob {
                id: Some("1".into()),
                title: "Engenheiro de Dados, Sénior".into(),
                description: "Line one\nLine \"two\"".into(),
                company_name: "Acme, S.A.".into(),
                publication_date: NaiveDate::from_ymd_opt(2023, 5, 10)
                    .unwrap()
                    .and_hms_opt(14, 0, 0),
                salary_text: "2000€".into(),
                location_names: vec!["Lisboa".into(), "Porto".into()],
            },
            NormalizedJob {
                id: None,
                title: "QA".into(),
                description: String::new(),
                company_name: String::new(),
                publication_date: None,
                salary_text: String::new(),
                location_names: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_jobs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.csv");
        let input = jobs();
        export(&path, |out| write_jobs(out, &input)).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap(),
            vec!["titulo", "empresa", "descricao", "data_publicacao", "salario", "localizacao"]
        );
        let rows: Vec<JobRow> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        for (row, job) in rows.iter().zip(&input) {
            assert_eq!(row.titulo, job.title);
            assert_eq!(row.empresa, job.company_name);
            assert_eq!(row.descricao, job.description);
            assert_eq!(row.localizacao, job.location_names.join(", "));
        }
        assert_eq!(rows[0].data_publicacao, "2023-05-10T14:00:00");
        assert_eq!(rows[1].data_publicacao, "");
    }

    #[test]
    fn test_empty_export_has_header() {
        let mut buf = Vec::new();
        write_jobs(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "titulo,empresa,descricao,data_publicacao,salario,localizacao\n"
        );
    }

    #[test]
    fn test_key_values() {
        let record = json!({
            "id": 42,
            "title": "Dev",
            "company": {"name": "Acme"},
            "remote": null,
        });
        let mut buf = Vec::new();
        write_key_values(&mut buf, record.as_object().unwrap()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("key,value\n"));
        assert!(text.contains("id,42\n"));
        assert!(text.contains("title,Dev\n"));
        assert!(text.contains("company,\"{\"\"name\"\":\"\"Acme\"\"}\"\n"));
        assert!(text.contains("remote,\n") || text.contains("remote,\"\"\n"));
    }

    #[test]
    fn test_zone_counts() {
        let rows = vec![ZoneTypeCount {
            zone: "Lisboa".into(),
            job_type: "Full-time".into(),
            count: 3,
        }];
        let mut buf = Vec::new();
        write_zone_counts(&mut buf, &rows).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Zona,Tipo de Trabalho,Nº de vagas\nLisboa,Full-time,3\n"
        );
    }

    #[test]
    fn test_skill_counts() {
        let rows = vec![
            SkillCount { skill: "python".into(), count: 7 },
            SkillCount { skill: "c++".into(), count: 0 },
        ];
        let mut buf = Vec::new();
        write_skill_counts(&mut buf, &rows).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "skill,count\npython,7\nc++,0\n");
    }
}

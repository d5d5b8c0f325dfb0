//! Question dataset loading from a CSV export of the question sheet.
//!
//! Expected headers: `id, question, ch_question, question_type, options,
//! ch_options, answer, image`. The camelCase spellings used by the sheet
//! (`chQuestion`, `questionType`, ...) are accepted too, and missing columns
//! read as empty. Option lists are `|`-separated in a single cell.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quiz_core::model::{Question, QuestionError, QuestionId, QuestionSet, QuestionType};
use serde::Deserialize;

use crate::error::DatasetError;

const OPTION_SEPARATOR: char = '|';

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuestionRow {
    id: String,
    question: String,
    #[serde(alias = "chQuestion")]
    ch_question: String,
    #[serde(alias = "questionType", alias = "type")]
    question_type: String,
    options: String,
    #[serde(alias = "chOptions")]
    ch_options: String,
    answer: String,
    image: String,
}

/// Load and validate the question set from a CSV file.
///
/// # Errors
///
/// Returns `DatasetError` if the file cannot be read or its contents are not
/// a usable question set.
pub fn load_questions_csv(path: &Path) -> Result<QuestionSet, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let questions = parse_questions_csv(file)?;
    tracing::info!(path = %path.display(), questions = questions.len(), "dataset loaded");
    Ok(questions)
}

/// Parse a question set from CSV text.
///
/// Rows without an id are skipped. A blank question type means multiple
/// choice when options are present and fill-in-blank otherwise.
///
/// # Errors
///
/// Returns `DatasetError::EmptySheet` when there are no data rows,
/// `DatasetError::NoValidRows` when no row has an id, and
/// `DatasetError::InvalidRow` / `DatasetError::QuestionSet` for bad rows.
pub fn parse_questions_csv<R: Read>(reader: R) -> Result<QuestionSet, DatasetError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = 0_u64;
    let mut questions = Vec::new();
    for record in csv.deserialize::<QuestionRow>() {
        let record = record?;
        rows += 1;
        if record.id.is_empty() {
            tracing::debug!(row = rows, "skipping row without id");
            continue;
        }
        let question = row_to_question(record)
            .map_err(|source| DatasetError::InvalidRow { row: rows, source })?;
        questions.push(question);
    }

    if rows == 0 {
        return Err(DatasetError::EmptySheet);
    }
    if questions.is_empty() {
        return Err(DatasetError::NoValidRows);
    }
    Ok(QuestionSet::new(questions)?)
}

fn row_to_question(row: QuestionRow) -> Result<Question, QuestionError> {
    let id = QuestionId::new(row.id)?;
    let options = split_options(&row.options);
    let question_type = if row.question_type.is_empty() {
        if options.is_empty() {
            QuestionType::FillInBlank
        } else {
            QuestionType::MultipleChoice
        }
    } else {
        row.question_type.parse()?
    };

    Ok(Question::new(id, question_type, row.answer)
        .with_question(row.question)
        .with_ch_question(row.ch_question)
        .with_options(options)
        .with_ch_options(split_options(&row.ch_options))
        .with_image(row.image))
}

fn split_options(cell: &str) -> Vec<String> {
    cell.split(OPTION_SEPARATOR)
        .map(str::trim)
        .filter(|opt| !opt.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionSetError;

    #[test]
    fn parses_rows_in_order() {
        let data = "\
id,question,chQuestion,questionType,options,chOptions,answer,image
1,Largest planet?,最大的行星?,Multiple Choice,A. Mars | B. Jupiter | C. Venus,A. 火星|B. 木星|C. 金星,B,
2,Powerhouse of the cell,,Fill in the blank,,,Mitochondria,cell.png
";
        let set = parse_questions_csv(data.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);

        let first = set.first();
        assert_eq!(first.id().as_str(), "1");
        assert_eq!(first.question_type(), QuestionType::MultipleChoice);
        assert_eq!(first.options(), ["A. Mars", "B. Jupiter", "C. Venus"]);
        assert_eq!(first.ch_options().len(), 3);
        assert_eq!(first.ch_question(), Some("最大的行星?"));
        assert_eq!(first.image(), None);
        assert_eq!(first.answer(), "B");

        let second = set.at(1).unwrap();
        assert_eq!(second.question_type(), QuestionType::FillInBlank);
        assert_eq!(second.image(), Some("cell.png"));
    }

    #[test]
    fn skips_rows_without_id_and_infers_type() {
        let data = "\
id,question,options,answer
,orphan row,,x
q1,Pick one,A|B,A
q2,Type it,,word
";
        let set = parse_questions_csv(data.as_bytes()).unwrap();
        assert_eq!(set.ids().len(), 2);
        assert_eq!(set.first().question_type(), QuestionType::MultipleChoice);
        assert_eq!(set.at(1).unwrap().question_type(), QuestionType::FillInBlank);
    }

    #[test]
    fn empty_sheets_are_load_failures() {
        assert!(matches!(
            parse_questions_csv("id,question,answer\n".as_bytes()),
            Err(DatasetError::EmptySheet)
        ));
        assert!(matches!(
            parse_questions_csv("id,question,answer\n,q,a\n  ,r,b\n".as_bytes()),
            Err(DatasetError::NoValidRows)
        ));
    }

    #[test]
    fn reports_bad_rows() {
        let err = parse_questions_csv("id,question_type,answer\nq1,essay,x\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRow { row: 1, .. }));

        let err = parse_questions_csv("id,answer\nq1,A\nq1,B\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::QuestionSet(QuestionSetError::DuplicateId(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_questions_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}

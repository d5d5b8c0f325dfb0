use std::fmt;

use quiz_core::model::{Question, View};
use quiz_core::scoring::GridStatus;
use services::{GridCell, QuizSnapshot};

/// Plain-text rendering of one snapshot, one screen per view.
pub struct Screen<'a>(pub &'a QuizSnapshot);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.view {
            View::Start => render_start(f, self.0),
            View::Quiz => render_quiz(f, self.0),
            View::Result => render_result(f, self.0),
        }
    }
}

fn render_start(out: &mut fmt::Formatter<'_>, snap: &QuizSnapshot) -> fmt::Result {
    writeln!(out, "== Quiz ==")?;
    writeln!(out, "{} questions", snap.progress.total)?;
    if snap.can_continue {
        writeln!(
            out,
            "In progress: {}/{} answered, {} elapsed (quiz continue)",
            snap.progress.answered, snap.progress.total, snap.elapsed_display
        )?;
    }
    if snap.can_view_result {
        writeln!(out, "Last result available (quiz result)")?;
    }
    writeln!(out, "Start a new attempt with `quiz start`.")
}

fn render_quiz(out: &mut fmt::Formatter<'_>, snap: &QuizSnapshot) -> fmt::Result {
    writeln!(
        out,
        "== Question {}/{} ==  [{}]  {}/{} answered",
        snap.current_index + 1,
        snap.progress.total,
        snap.elapsed_display,
        snap.progress.answered,
        snap.progress.total
    )?;
    write_question(out, &snap.current)?;
    let answer = if snap.current_answer.trim().is_empty() {
        "(no answer)"
    } else {
        snap.current_answer.as_str()
    };
    writeln!(out, "Your answer: {answer}")?;
    writeln!(out, "{}", grid_line(&snap.grid, false))?;
    if snap.progress.is_complete() {
        writeln!(out, "All questions answered. Finish with `quiz submit`.")?;
    }
    Ok(())
}

fn render_result(out: &mut fmt::Formatter<'_>, snap: &QuizSnapshot) -> fmt::Result {
    let score = &snap.score;
    writeln!(
        out,
        "== Result ==  {}/{} correct ({:.1}%)  time {}",
        score.correct, score.total, score.percent, snap.elapsed_display
    )?;
    writeln!(
        out,
        "wrong {}  unanswered {}",
        score.wrong, score.unanswered
    )?;
    writeln!(out, "{}", grid_line(&snap.grid, true))?;
    writeln!(out)?;
    writeln!(
        out,
        "-- Review {}/{} --",
        snap.review_index + 1,
        score.total
    )?;
    write_question(out, &snap.review)?;
    let verdict = if snap.review_is_correct() { "correct" } else { "wrong" };
    let answer = if snap.review_answer.trim().is_empty() {
        "(no answer)"
    } else {
        snap.review_answer.as_str()
    };
    writeln!(out, "Your answer: {answer} ({verdict})")?;
    writeln!(out, "Correct answer: {}", snap.review.answer())
}

fn write_question(out: &mut fmt::Formatter<'_>, question: &Question) -> fmt::Result {
    writeln!(out, "[{}] {}", question.id(), question.question().unwrap_or(""))?;
    if let Some(ch) = question.ch_question() {
        writeln!(out, "    {ch}")?;
    }
    for (index, option) in question.options().iter().enumerate() {
        match question.ch_options().get(index) {
            Some(ch) => writeln!(out, "  {option}  /  {ch}")?,
            None => writeln!(out, "  {option}")?,
        }
    }
    if let Some(image) = question.image() {
        writeln!(out, "  image: {image}")?;
    }
    Ok(())
}

// Quiz view only shows answered/unanswered; the result view shows marks.
fn grid_line(grid: &[GridCell], scored: bool) -> String {
    grid.iter()
        .map(|cell| {
            let mark = if scored {
                match cell.status {
                    GridStatus::Correct => "+",
                    GridStatus::Wrong => "x",
                    GridStatus::Unanswered => ".",
                }
            } else if cell.answered {
                "*"
            } else {
                "."
            };
            format!("{}{mark}", cell.id)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

use anyhow::Context as _;
use driveprep::catalog::Catalog;
use driveprep::models::UserContext;
use driveprep::session::QuizSession;
use driveprep::{build_sink, stats};
use std::io::{self, Write as _};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let catalog = Catalog::embedded()?;
    let sink = build_sink();
    let mut ctx = UserContext {
        user_id: std::env::var("USER_ID").ok().and_then(|v| v.parse().ok()),
        selected_state: String::new(),
    };

    let states = catalog.available_states();
    println!("Available states:");
    for (i, state) in states.iter().enumerate() {
        println!("  {}. {}", i + 1, state);
    }
    let state = loop {
        let input = prompt("Select a state: ")?;
        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| states.get(i));
        match picked {
            Some(s) => break s.to_string(),
            None => println!("enter a number between 1 and {}", states.len()),
        }
    };
    ctx.selected_state = state.clone();

    println!("\nTests for {state}:");
    for summary in catalog.test_summaries(&state) {
        println!(
            "  {}. {} ({} questions)",
            summary.test_number, summary.title, summary.question_count
        );
    }
    let test_number = loop {
        let input = prompt("Select a test: ")?;
        match input.parse::<u32>().ok().filter(|n| catalog.quiz(&state, *n).is_some()) {
            Some(n) => break n,
            None => println!("unknown test number"),
        }
    };

    let quiz = catalog
        .quiz(&state, test_number)
        .context("selected test disappeared from the catalog")?;
    println!("\n{}", quiz.title);
    let mut session = QuizSession::start(state.clone(), test_number, quiz.questions.clone())?;

    let result = loop {
        let question = session.current_question();
        println!(
            "\nQuestion {}/{}: {}",
            session.current_index() + 1,
            session.question_count(),
            question.prompt
        );
        for (i, option) in question.options.iter().enumerate() {
            let letter = (b'A' + i as u8) as char;
            let marker = if session.current_answer() == Some(option.as_str()) { '*' } else { ' ' };
            println!(" {marker} {letter}. {option}");
        }

        let input = prompt("Answer letter, n = next, p = previous: ")?;
        match input.to_lowercase().as_str() {
            "n" => match session.advance() {
                Ok(Some(result)) => break result,
                Ok(None) => {}
                Err(err) => println!("{err}"),
            },
            "p" => {
                if let Err(err) = session.retreat() {
                    println!("{err}");
                }
            }
            letter => {
                let choice = letter
                    .bytes()
                    .next()
                    .filter(|_| letter.len() == 1)
                    .and_then(|b| b.checked_sub(b'a'))
                    .map(usize::from)
                    .and_then(|i| session.current_question().options.get(i).cloned());
                match choice {
                    Some(option) => {
                        if let Err(err) = session.select_answer(&option) {
                            println!("{err}");
                        }
                    }
                    None => {
                        let last = (b'A' + session.current_question().options.len() as u8 - 1) as char;
                        println!("enter a letter between A and {last}");
                    }
                }
            }
        }
    };

    let score = session.score()?;
    println!(
        "\nQuiz complete: {}% ({} of {} correct)",
        score.percentage, score.score, score.total
    );
    for (i, (question, answer)) in quiz.questions.iter().zip(result.answers.iter()).enumerate() {
        let given = answer.as_deref().unwrap_or("not answered");
        if question.is_correct(given) {
            println!("  {}. correct ({given})", i + 1);
        } else {
            println!(
                "  {}. wrong: answered {given}, correct answer is {}",
                i + 1,
                question.correct_answer
            );
            if let Some(explanation) = &question.explanation {
                println!("     {explanation}");
            }
        }
    }

    // The score above never waits on persistence; the process waits before
    // exiting so the spawned writes are not cut off.
    let (local, remote) = sink.finalize(result, ctx);
    let _ = tokio::join!(local, remote);

    let summary = stats::summarize(&sink.history().await);
    println!("\nAttempts so far: {}", summary.attempts);
    if let (Some(avg), Some(best)) = (summary.average_percentage, summary.best_percentage) {
        println!("Average score: {avg}%  Best score: {best}%");
    }
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        anyhow::bail!("stdin closed before the quiz finished");
    }
    Ok(line.trim().to_string())
}

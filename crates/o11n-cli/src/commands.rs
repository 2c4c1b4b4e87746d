//! Subcommand handlers

use crate::process::ProcessExecutor;
use anyhow::{bail, Context};
use clap::ArgMatches;
use o11n_core::{CustomTemplate, FileNode, Mode, O11nConfig, ProjectRoot, Session};
use o11n_plan::{filter as filter_plan, PlanDocument};
use o11n_prompt::{estimate_tokens, render_tree, ApproxTokenCounter, PromptAssembler};
use std::path::PathBuf;

/// Parse `FILE:INDEX`, splitting on the last colon
pub(crate) fn parse_change_ref(value: &str) -> Result<(String, usize), String> {
    let (path, index) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected FILE:INDEX, got `{value}`"))?;
    if path.is_empty() {
        return Err(format!("missing file in `{value}`"));
    }
    let index = index
        .parse()
        .map_err(|_| format!("invalid change index `{index}`"))?;
    Ok((path.to_string(), index))
}

fn strings<'a>(args: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a String> + 'a {
    args.get_many::<String>(id).into_iter().flatten()
}

async fn read_plan(args: &ArgMatches) -> anyhow::Result<String> {
    let path = args
        .get_one::<PathBuf>("plan")
        .context("missing plan path")?;
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read plan {}", path.display()))
}

/// Load the plan into a session and apply `--reject` / `--reject-file`
async fn reviewed_session(config: O11nConfig, args: &ArgMatches) -> anyhow::Result<Session> {
    let mut session = Session::new(config);
    session.set_plan(read_plan(args).await?);

    for path in strings(args, "reject-file") {
        if !session.set_file_selected(path, false) {
            tracing::warn!(path = %path, "no such file in plan");
        }
    }
    if let Some(rejects) = args.get_many::<(String, usize)>("reject") {
        for (path, index) in rejects {
            if !session.set_change_selected(path, *index, false) {
                tracing::warn!(path = %path, index, "no such change in plan");
            }
        }
    }
    Ok(session)
}

pub(crate) fn tree(args: &ArgMatches) -> anyhow::Result<()> {
    let paths: Vec<&String> = strings(args, "paths").collect();
    println!("{}", render_tree(&paths[..]));
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
pub(crate) async fn prompt(config: O11nConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let assembler = PromptAssembler::with_ttl(config.prompt_cache_capacity, config.prompt_cache_ttl());
    let mut session = Session::new(config);

    for path in strings(args, "file") {
        let size = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.len() as f64 / (1024.0 * 1024.0));
        let node = match size {
            Ok(megabytes) => FileNode::new(path.clone()).with_size(megabytes),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "cannot stat file");
                FileNode::new(path.clone())
            }
        };
        session.select_file(node);
    }
    for path in strings(args, "root") {
        session.add_project(ProjectRoot::new(path.clone()));
    }
    for (index, path) in strings(args, "template").enumerate() {
        session.add_template(CustomTemplate::new(index.to_string(), path.clone()));
    }
    if let Some(instructions) = args.get_one::<String>("instructions") {
        session.set_instructions(instructions.clone());
    }
    if let Some(mode) = args.get_one::<Mode>("mode") {
        session.set_mode(*mode);
    }

    let prompt = assembler.build(&session.prompt_request()).await?;
    println!("{prompt}");

    match estimate_tokens(&ApproxTokenCounter::default(), &prompt).await {
        Some(tokens) => eprintln!("~{tokens} tokens"),
        None => eprintln!("token count unavailable"),
    }
    Ok(())
}

pub(crate) async fn preview(args: &ArgMatches) -> anyhow::Result<()> {
    let document = PlanDocument::parse(&read_plan(args).await?);

    if let Some((path, index)) = args.get_one::<(String, usize)>("diff") {
        let change = document
            .file(path)
            .and_then(|file| file.changes.get(*index))
            .with_context(|| format!("no change {index} in {path}"))?;
        println!("{}", change.preview());
        return Ok(());
    }

    let summary = document.summary();
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if !summary.description.is_empty() {
        println!("{}\n", summary.description);
    }
    for file in &summary.files {
        match &file.action {
            Some(action) => println!("{} ({action})", file.path),
            None => println!("{}", file.path),
        }
        for (index, description) in file.descriptions.iter().enumerate() {
            println!("  [{index}] {description}");
        }
    }
    for path in &document.duplicates {
        eprintln!("warning: repeated entry for {path} ignored");
    }
    Ok(())
}

pub(crate) async fn filter(config: O11nConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let session = reviewed_session(config, args).await?;
    let payload = filter_plan(session.document(), session.selections())?;
    print!("{payload}");
    Ok(())
}

pub(crate) async fn commit(config: O11nConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let executor = match args.get_one::<String>("executor") {
        Some(command) => ProcessExecutor::new(command.clone(), Vec::new()),
        None => match &config.executor.command {
            Some(command) => ProcessExecutor::new(command.clone(), config.executor.args.clone()),
            None => bail!("no executor configured; pass --executor or set [executor] command"),
        },
    };

    let mut session = reviewed_session(config, args).await?;
    if !session.can_commit() {
        bail!("plan is not committable: it needs `# Plan`, `### File` and `### Action` markers");
    }

    let outcome = session.commit(&executor).await?;
    for file in &outcome.report.success {
        println!("applied  {}", file.path);
    }
    for file in &outcome.report.errors {
        println!("failed   {}: {}", file.path, file.messages.join("; "));
    }
    for file in &outcome.new_files {
        let size = file.display_size().unwrap_or_default();
        println!("created  {} ({size})", file.path);
    }
    for path in &outcome.skipped_duplicates {
        eprintln!("warning: repeated entry for {path} was not applied");
    }
    if !outcome.filtered {
        eprintln!("warning: selections did not match the plan; the full plan was applied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_refs_split_on_last_colon() {
        assert_eq!(parse_change_ref("src/a.rs:2"), Ok(("src/a.rs".into(), 2)));
        assert_eq!(parse_change_ref("C:/x.rs:0"), Ok(("C:/x.rs".into(), 0)));
        assert!(parse_change_ref("a.rs").is_err());
        assert!(parse_change_ref(":1").is_err());
        assert!(parse_change_ref("a.rs:x").is_err());
    }
}

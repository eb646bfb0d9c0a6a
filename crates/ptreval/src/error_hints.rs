use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("source root")
        || haystack.contains("no such file or directory")
        || haystack.contains("not a directory")
    {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Use an absolute path to avoid working-directory confusion.",
        );
    }

    if haystack.contains("discover.json") || haystack.contains("discovery report") {
        push_hint(
            &mut out,
            "Run `ptreval discover --source <dir> --out <dir>` first, or pass `--discovery <file>`.",
        );
    }

    if haystack.contains("results.jsonl") {
        push_hint(
            &mut out,
            "Run the analysis tool on each `<out>/<config>/input.json` and write its records to `<out>/<config>/results.jsonl`.",
        );
    }

    if haystack.contains("summary.json") || haystack.contains("summary-per-file.jsonl") {
        push_hint(&mut out, "Run `ptreval summarize --out <dir>` first.");
    }

    if haystack.contains("eval.json") {
        push_hint(&mut out, "Run `ptreval compare --out <dir>` first.");
    }

    if haystack.contains("buckets") {
        push_hint(
            &mut out,
            "Use `--buckets` (or `buckets` in the profile) with at least one bucket per configuration.",
        );
    }

    if haystack.contains("received no files") {
        push_hint(
            &mut out,
            "The corpus is too small for the bucket count; lower `--buckets` or raise `--limit`.",
        );
    }

    if haystack.contains("unknown profile") {
        push_hint(
            &mut out,
            "Select a profile defined in the profiles file with `--profile <name>`.",
        );
    }

    if haystack.contains("toml") || haystack.contains("profiles file") {
        push_hint(
            &mut out,
            "Check `ptreval.toml` syntax: each `[[profiles]]` needs a `name` and at least one `[[profiles.configs]]`.",
        );
    }

    out
}

fn push_hint(out: &mut Vec<String>, hint: &str) {
    if !out.iter().any(|h| h == hint) {
        out.push(hint.to_string());
    }
}

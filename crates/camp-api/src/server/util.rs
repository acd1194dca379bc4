fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS,PUT,PATCH,DELETE"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

fn default_sqlite_path() -> String {
    std::env::var("PAYDIRT_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

fn reconnect_token(tick: u64, sequence_in_tick: Option<u64>, kind: &str) -> String {
    format!("{kind}:{tick}:{}", sequence_in_tick.unwrap_or(0))
}

/// Without an attached store the only snapshot available is the live one.
fn fallback_snapshot_window(engine: &EngineApi, from_tick: u64, to_tick: u64) -> Vec<Snapshot> {
    let snapshot = engine.snapshot_for_current_tick();
    if snapshot.tick >= from_tick && snapshot.tick <= to_tick {
        vec![snapshot]
    } else {
        Vec::new()
    }
}

fn paginate(
    total: usize,
    cursor: Option<usize>,
    page_size: Option<usize>,
) -> Result<(usize, usize, Option<usize>), HttpApiError> {
    let start = cursor.unwrap_or(0);
    if start > total {
        return Err(HttpApiError::invalid_query(
            "cursor is out of bounds",
            Some(format!("cursor={start} total={total}")),
        ));
    }

    let size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .max(1)
        .min(MAX_PAGE_SIZE);
    let end = start.saturating_add(size).min(total);
    let next_cursor = if end < total { Some(end) } else { None };

    Ok((start, end, next_cursor))
}

/// Parse a comma-separated event-type filter using the contract's
/// snake_case names.
fn parse_event_type_filter(
    requested: Option<&str>,
) -> Result<Option<HashSet<EventType>>, HttpApiError> {
    let Some(raw) = requested.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(None);
    };

    let mut filter = HashSet::new();
    for value in raw.split(',') {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let event_type =
            serde_json::from_value::<EventType>(Value::String(normalized.clone())).map_err(
                |_| {
                    HttpApiError::invalid_query(
                        "unknown event type in filter",
                        Some(format!("value={normalized}")),
                    )
                },
            )?;
        filter.insert(event_type);
    }

    if filter.is_empty() {
        return Ok(None);
    }

    Ok(Some(filter))
}

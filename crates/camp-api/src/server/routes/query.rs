#[derive(Debug, Deserialize)]
struct SubmitCommandRequest {
    command: Command,
    effective_tick: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CommandLogQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TimelineQuery {
    cursor: Option<usize>,
    page_size: Option<usize>,
    /// Comma-separated event type filter, e.g. `gold_credited,ore_deposited`.
    types: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SnapshotsQuery {
    from_tick: Option<u64>,
    to_tick: Option<u64>,
}

async fn submit_command(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<SubmitCommandRequest>,
) -> Result<Json<contracts::CommandResult>, HttpApiError> {
    if request.command.run_id != run_id {
        return Err(HttpApiError::invalid_query(
            "command.run_id does not match path run_id",
            Some(format!(
                "path={} command={}",
                run_id, request.command.run_id
            )),
        ));
    }

    let (result, messages) = {
        let mut inner = state.inner.lock().await;
        let result = {
            let engine = require_run_mut(&mut inner, &run_id)?;
            engine.submit_command(request.command, request.effective_tick)
        };
        let mut messages = collect_delta_messages(&mut inner);
        if let Some(engine) = inner.engine.as_ref() {
            if let Some(entry) = engine.command_log().last() {
                messages.push(StreamMessage::command_result(
                    entry,
                    engine.status().current_tick,
                ));
            }
        }
        (result, messages)
    };

    broadcast_messages(&state, messages);
    Ok(Json(result))
}

async fn get_commands(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<CommandLogQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let log = engine.command_log();
    let (start, end, next_cursor) = paginate(log.len(), query.cursor, query.page_size)?;

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "commands".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "commands": &log[start..end],
            "total": log.len(),
            "next_cursor": next_cursor,
        }),
    }))
}

async fn get_timeline(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let filter = parse_event_type_filter(query.types.as_deref())?;

    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let filtered = engine
        .events()
        .iter()
        .filter(|event| {
            filter
                .as_ref()
                .map(|types| types.contains(&event.event_type))
                .unwrap_or(true)
        })
        .collect::<Vec<_>>();

    let (start, end, next_cursor) = paginate(filtered.len(), query.cursor, query.page_size)?;

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "timeline".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!({
            "events": &filtered[start..end],
            "total": filtered.len(),
            "next_cursor": next_cursor,
        }),
    }))
}

async fn get_snapshots(
    Path(run_id): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SnapshotsQuery>,
) -> Result<Json<QueryResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let engine = require_run(&inner, &run_id)?;

    let from_tick = query.from_tick.unwrap_or(0);
    let to_tick = query.to_tick.unwrap_or(engine.status().current_tick);
    if to_tick < from_tick {
        return Err(HttpApiError::invalid_query(
            "to_tick must be >= from_tick",
            Some(format!("from_tick={from_tick} to_tick={to_tick}")),
        ));
    }

    let snapshots = match engine.load_snapshots_range(&run_id, from_tick, to_tick) {
        Ok(snapshots) => snapshots,
        Err(PersistenceError::NotAttached) => {
            fallback_snapshot_window(engine, from_tick, to_tick)
        }
        Err(other) => return Err(HttpApiError::from_persistence(other)),
    };

    Ok(Json(QueryResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        query_type: "snapshots".to_string(),
        run_id,
        generated_at_tick: engine.status().current_tick,
        data: json!({ "snapshots": snapshots }),
    }))
}

//! Interactive widget session: restore, then loop over user intents.

use anyhow::Context;
use inquire::{InquireError, Select, Text};
use meteo_core::{Config, ViewState, WidgetController, WidgetError, WidgetId};
use std::fmt;

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Refresh,
    Recenter,
    Remove,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Add => "Добавить виджет",
            Action::Refresh => "Обновить",
            Action::Recenter => "Показать на карте",
            Action::Remove => "Удалить",
            Action::Quit => "Выход",
        })
    }
}

fn available_actions(view: &ViewState) -> Vec<Action> {
    if view.widgets.is_empty() {
        vec![Action::Add, Action::Quit]
    } else {
        vec![
            Action::Add,
            Action::Refresh,
            Action::Recenter,
            Action::Remove,
            Action::Quit,
        ]
    }
}

struct WidgetChoice {
    id: WidgetId,
    label: String,
}

impl fmt::Display for WidgetChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// `None` when the user backed out of the prompt.
fn answered<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read from terminal"),
    }
}

fn pick_widget(view: &ViewState, prompt: &str) -> anyhow::Result<Option<WidgetId>> {
    let choices = view
        .widgets
        .iter()
        .map(|w| WidgetChoice {
            id: w.id.clone(),
            label: render::widget_label(w),
        })
        .collect();

    Ok(answered(Select::new(prompt, choices).prompt())?.map(|choice| choice.id))
}

fn prompt_coordinates(view: &ViewState, config: &Config) -> anyhow::Result<Option<(String, String)>> {
    let center = config.map.default_center;

    let latitude = Text::new("Широта:")
        .with_placeholder(&center.latitude.to_string())
        .with_initial_value(&view.input.latitude)
        .prompt();
    let Some(latitude) = answered(latitude)? else {
        return Ok(None);
    };

    let longitude = Text::new("Долгота:")
        .with_placeholder(&center.longitude.to_string())
        .with_initial_value(&view.input.longitude)
        .prompt();
    let Some(longitude) = answered(longitude)? else {
        return Ok(None);
    };

    Ok(Some((latitude, longitude)))
}

/// Failures already surface as the view's banner.
fn settle<T>(result: Result<T, WidgetError>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "intent failed");
    }
}

pub async fn run(controller: &WidgetController, config: &Config) -> anyhow::Result<()> {
    let report = controller.restore().await;
    render::print_restore_report(&report);

    let mut views = controller.subscribe();
    render::print_view(&views.borrow_and_update(), config);

    loop {
        let view = controller.view();

        let Some(action) = answered(Select::new("Действие:", available_actions(&view)).prompt())?
        else {
            break;
        };

        match action {
            Action::Quit => break,
            Action::Add => {
                if let Some((latitude, longitude)) = prompt_coordinates(&view, config)? {
                    settle(controller.add(&latitude, &longitude).await);
                }
            }
            Action::Refresh => {
                if let Some(id) = pick_widget(&view, "Обновить виджет:")? {
                    settle(controller.refresh(&id).await);
                }
            }
            Action::Recenter => {
                if let Some(id) = pick_widget(&view, "Центрировать карту на:")? {
                    controller.recenter(&id);
                }
            }
            Action::Remove => {
                if let Some(id) = pick_widget(&view, "Удалить виджет:")? {
                    controller.remove(&id);
                }
            }
        }

        if views.has_changed().unwrap_or(false) {
            render::print_view(&views.borrow_and_update(), config);

            // Shown once; don't repeat it on the next redraw.
            controller.dismiss_banner();
            let _ = views.borrow_and_update();
        }
    }

    Ok(())
}

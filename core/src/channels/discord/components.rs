//! Interactive file selection buttons.
//!
//! [`AttachmentPrompt`] renders one button per attachment on the deferred
//! ephemeral reply of a context-menu command and waits for the invoker to
//! click one. Clicks arrive through the gateway handler, which routes them
//! into [`PendingSelections`] by the `select:<prompt>:<attachment>` custom id.

use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{
    builder::{
        CreateActionRow, CreateButton, CreateInteractionResponse, CreateInteractionResponseMessage,
        EditInteractionResponse,
    },
    model::application::ButtonStyle,
};

use crate::attachment::{PendingSelection, PendingSelections, SelectionControl, SelectionPrompt};
use crate::error::{EndermiteError, Result};
use crate::pipeline::PipelineFailure;
use crate::types::MessageAction;

/// Custom id prefix of clickable selection buttons
const SELECT_PREFIX: &str = "select";

/// Custom id prefix of disabled buttons
const SKIP_PREFIX: &str = "skip";

/// Discord limits
const BUTTONS_PER_ROW: usize = 5;
const MAX_ROWS: usize = 5;
const MAX_LABEL_CHARS: usize = 80;

/// Custom id for an eligible attachment's button
pub fn selection_id(prompt_id: &str, key: &str) -> String {
    format!("{}:{}:{}", SELECT_PREFIX, prompt_id, key)
}

/// Split a selection button id into `(prompt id, attachment key)`
pub fn parse_selection_id(custom_id: &str) -> Option<(&str, &str)> {
    let rest = custom_id.strip_prefix(SELECT_PREFIX)?.strip_prefix(':')?;
    let (prompt_id, key) = rest.split_once(':')?;
    if prompt_id.is_empty() || key.is_empty() {
        return None;
    }
    Some((prompt_id, key))
}

fn button_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        return label.to_string();
    }
    let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
    short.push('…');
    short
}

/// Lay the controls out as button rows
fn button_rows(prompt_id: &str, controls: &[SelectionControl]) -> Vec<CreateActionRow> {
    controls
        .chunks(BUTTONS_PER_ROW)
        .take(MAX_ROWS)
        .map(|row| {
            let buttons = row
                .iter()
                .map(|control| {
                    if control.enabled {
                        CreateButton::new(selection_id(prompt_id, &control.key))
                            .label(button_label(&control.label))
                            .style(ButtonStyle::Primary)
                    } else {
                        CreateButton::new(format!("{}:{}:{}", SKIP_PREFIX, prompt_id, control.key))
                            .label(button_label(&control.label))
                            .style(ButtonStyle::Secondary)
                            .disabled(true)
                    }
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}

/// Selection prompt on a command's deferred ephemeral reply
pub struct AttachmentPrompt<'a> {
    ctx: &'a serenity::Context,
    interaction: &'a serenity::CommandInteraction,
    selections: &'a PendingSelections<serenity::ComponentInteraction>,
    action: MessageAction,
    pending: Option<PendingSelection<serenity::ComponentInteraction>>,
    clicked: Option<serenity::ComponentInteraction>,
}

impl<'a> AttachmentPrompt<'a> {
    pub fn new(
        ctx: &'a serenity::Context,
        interaction: &'a serenity::CommandInteraction,
        selections: &'a PendingSelections<serenity::ComponentInteraction>,
        action: MessageAction,
    ) -> Self {
        Self {
            ctx,
            interaction,
            selections,
            action,
            pending: None,
            clicked: None,
        }
    }
}

#[async_trait]
impl SelectionPrompt for AttachmentPrompt<'_> {
    async fn present(&mut self, controls: &[SelectionControl]) -> Result<()> {
        let keys = controls
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.key.clone());
        let pending = self.selections.register(self.interaction.user.id.get(), keys);
        let rows = button_rows(pending.prompt_id(), controls);
        self.pending = Some(pending);

        self.interaction
            .edit_response(
                self.ctx,
                EditInteractionResponse::new()
                    .content(self.action.selection_prompt())
                    .components(rows),
            )
            .await?;
        Ok(())
    }

    async fn await_choice(&mut self, timeout: Duration) -> Result<Option<String>> {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| EndermiteError::Other("selection awaited before it was presented".to_string()))?;

        let Some(activation) = pending.wait(timeout).await else {
            return Ok(None);
        };
        self.clicked = Some(activation.payload);
        Ok(Some(activation.key))
    }

    async fn acknowledge(&mut self, _key: &str) -> Result<()> {
        let Some(click) = self.clicked.take() else {
            return Ok(());
        };
        click
            .create_response(
                self.ctx,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content(self.action.selection_ack())
                        .components(vec![]),
                ),
            )
            .await?;
        Ok(())
    }

    async fn expire(&mut self) -> Result<()> {
        self.interaction
            .edit_response(
                self.ctx,
                EditInteractionResponse::new()
                    .content(PipelineFailure::TimedOut.message(self.action))
                    .components(vec![]),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(key: &str, enabled: bool) -> SelectionControl {
        SelectionControl {
            key: key.to_string(),
            label: format!("{}.json", key),
            enabled,
        }
    }

    #[test]
    fn test_selection_id_roundtrip() {
        let id = selection_id("abc123", "1254781618196054108");
        assert_eq!(id, "select:abc123:1254781618196054108");
        assert_eq!(
            parse_selection_id(&id),
            Some(("abc123", "1254781618196054108"))
        );
    }

    #[test]
    fn test_parse_rejects_other_ids() {
        assert_eq!(parse_selection_id("skip:abc:1"), None);
        assert_eq!(parse_selection_id("select:abc"), None);
        assert_eq!(parse_selection_id("select::1"), None);
        assert_eq!(parse_selection_id("selection:abc:1"), None);
        assert_eq!(parse_selection_id("confirm_1234"), None);
    }

    #[test]
    fn test_long_labels_are_shortened() {
        let label = button_label(&"x".repeat(120));
        assert_eq!(label.chars().count(), MAX_LABEL_CHARS);
        assert!(label.ends_with('…'));
        assert_eq!(button_label("latest.log"), "latest.log");
    }

    #[test]
    fn test_button_rows_hold_five_buttons() {
        let controls: Vec<_> = (0..7).map(|i| control(&i.to_string(), i % 2 == 0)).collect();
        assert_eq!(button_rows("p", &controls).len(), 2);
        assert_eq!(button_rows("p", &controls[..5]).len(), 1);
    }

    #[test]
    fn test_prompt_ids_do_not_collide() {
        let table = PendingSelections::<()>::new();
        let first = table.register(1, vec!["a".to_string()]);
        let second = table.register(1, vec!["a".to_string()]);
        assert_ne!(
            selection_id(first.prompt_id(), "a"),
            selection_id(second.prompt_id(), "a")
        );
    }
}

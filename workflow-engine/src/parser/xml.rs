//! XML parsing, per spec.md §6's `<workflow>/<steps>/<transition>` shape.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::action::{Action, Execution};
use crate::arguments::Arguments;
use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::{Transition, WorkflowModel};

#[derive(Default)]
struct PartialTransition {
    label: Option<String>,
    note: Option<String>,
    from: Option<String>,
    to: Option<String>,
    actions: Vec<Action>,
}

#[derive(Default)]
struct PartialAction {
    actor: Option<String>,
    method: Option<String>,
    execution: Option<String>,
    arguments: Arguments,
}

pub fn parse(contents: &str) -> WorkflowResult<WorkflowModel> {
    let mut reader = Reader::from_str(contents);
    reader.config_mut().trim_text = true;

    let mut name = String::new();
    let mut description: Option<String> = None;
    let mut transitions = Vec::new();

    let mut transition: Option<PartialTransition> = None;
    let mut action: Option<PartialAction> = None;

    let mut in_arguments = false;
    let mut in_arg = false;
    let mut arg_list: Vec<String> = Vec::new();
    let mut arg_direct_text = String::new();

    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| WorkflowError::Xml(e.to_string()))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let local = local_name(e);
                let is_empty = matches!(event, Event::Empty(_));

                match local.as_str() {
                    "workflow" => {
                        if let Some(n) = attr(e, "name") {
                            name = n;
                        }
                    }
                    "description" => {}
                    "steps" | "transitions" => {}
                    "transition" => {
                        transition = Some(PartialTransition {
                            label: attr(e, "label"),
                            note: attr(e, "note"),
                            from: attr(e, "from"),
                            to: attr(e, "to"),
                            actions: Vec::new(),
                        });
                        if is_empty {
                            finalize_transition(&mut transition, &mut transitions)?;
                        }
                    }
                    "action" => {
                        action = Some(PartialAction {
                            actor: attr(e, "actor"),
                            method: attr(e, "method"),
                            execution: attr(e, "execution"),
                            arguments: Arguments::Omitted,
                        });
                        if is_empty {
                            finalize_action(&mut action, &mut transition)?;
                        }
                    }
                    "arguments" => {
                        in_arguments = true;
                        arg_list.clear();
                        arg_direct_text.clear();
                        if is_empty {
                            in_arguments = false;
                            if let Some(a) = action.as_mut() {
                                a.arguments = Arguments::Omitted;
                            }
                        }
                    }
                    "arg" => {
                        in_arg = true;
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| WorkflowError::Xml(err.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                if in_arg {
                    arg_list.push(text);
                } else if in_arguments {
                    arg_direct_text.push_str(&text);
                }
            }
            Event::End(ref e) => {
                let local = local_name_end(e);
                match local.as_str() {
                    "arg" => {
                        in_arg = false;
                    }
                    "arguments" => {
                        in_arguments = false;
                        let built = if !arg_list.is_empty() {
                            Arguments::from_strings(std::mem::take(&mut arg_list))
                        } else {
                            Arguments::from_single_string(std::mem::take(&mut arg_direct_text))
                        };
                        if let Some(a) = action.as_mut() {
                            a.arguments = built;
                        }
                    }
                    "action" => {
                        finalize_action(&mut action, &mut transition)?;
                    }
                    "transition" => {
                        finalize_transition(&mut transition, &mut transitions)?;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let _ = &mut description;

    let wf = WorkflowModel {
        name,
        description,
        transitions,
    };
    wf.validate()?;
    Ok(wf)
}

fn finalize_action(
    action: &mut Option<PartialAction>,
    transition: &mut Option<PartialTransition>,
) -> WorkflowResult<()> {
    let Some(a) = action.take() else {
        return Ok(());
    };
    let built = Action {
        actor: a.actor.ok_or_else(|| WorkflowError::Xml("action missing 'actor' attribute".into()))?,
        method: a.method.ok_or_else(|| WorkflowError::Xml("action missing 'method' attribute".into()))?,
        arguments: a.arguments,
        execution: Execution::parse(a.execution.as_deref()),
    };
    if let Some(t) = transition.as_mut() {
        t.actions.push(built);
    }
    Ok(())
}

fn finalize_transition(
    transition: &mut Option<PartialTransition>,
    transitions: &mut Vec<Transition>,
) -> WorkflowResult<()> {
    let Some(t) = transition.take() else {
        return Ok(());
    };
    let from = t.from.ok_or_else(|| WorkflowError::Xml("transition missing 'from' attribute".into()))?;
    let to = t.to.ok_or_else(|| WorkflowError::Xml("transition missing 'to' attribute".into()))?;
    transitions.push(Transition {
        label: t.label,
        note: t.note,
        states: (from, to),
        actions: t.actions,
    });
    Ok(())
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn local_name_end(e: &quick_xml::events::BytesEnd) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == name.as_bytes() {
            a.unescape_value().ok().map(|v| v.to_string())
        } else {
            None
        }
    })
}

//! Subjects and HTML bodies of the completion emails.

use chrono::NaiveDate;

use super::Notification;
use crate::models::client::Client;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::models::user::User;

const FOOTER: &str = "Ceci est une notification automatique de votre application de gestion de projet.";

pub fn task_completed(user: &User, task: &Task, project: Option<&Project>, on: NaiveDate) -> Notification {
    let mut details = format!("<strong>Priorité:</strong> {}<br>", escape(&task.priority));
    if let Some(project) = project {
        details.push_str(&format!("<strong>Projet:</strong> {}<br>", escape(&project.name)));
    }
    details.push_str(&format!("<strong>Date de complétion:</strong> {}", french_date(on)));

    Notification {
        to_name: user.name.clone(),
        to_email: user.email.clone(),
        subject: format!("✅ Tâche terminée: {}", task.title),
        html: layout(
            "Tâche terminée",
            &user.name,
            "La tâche suivante a été marquée comme terminée:",
            &task.title,
            task.description.as_deref(),
            &details,
            None,
        ),
    }
}

pub fn project_completed(
    user: &User,
    project: &Project,
    client: Option<&Client>,
    on: NaiveDate,
) -> Notification {
    let mut details = format!(
        "<strong>Statut:</strong> {}<br><strong>Progression:</strong> {}%<br>",
        escape(&project.status),
        project.progress
    );
    if let Some(client) = client {
        details.push_str(&format!("<strong>Client:</strong> {}<br>", escape(&client.name)));
    }
    details.push_str(&format!("<strong>Date de complétion:</strong> {}", french_date(on)));

    Notification {
        to_name: user.name.clone(),
        to_email: user.email.clone(),
        subject: format!("🎉 Projet terminé: {}", project.name),
        html: layout(
            "Projet terminé",
            &user.name,
            "Félicitations! Le projet suivant a été marqué comme terminé:",
            &project.name,
            project.description.as_deref(),
            &details,
            Some("🎉 Excellent travail!"),
        ),
    }
}

fn layout(
    heading: &str,
    user_name: &str,
    intro: &str,
    title: &str,
    description: Option<&str>,
    details: &str,
    cheer: Option<&str>,
) -> String {
    let description = description
        .filter(|d| !d.trim().is_empty())
        .map(|d| format!(r#"<p style="color: #6b7280;">{}</p>"#, escape(d)))
        .unwrap_or_default();
    let cheer = cheer
        .map(|c| format!(r#"<p style="color: #22c55e; font-weight: bold; font-size: 18px;">{c}</p>"#))
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #6366f1;">{heading}</h2>
  <p>Bonjour {name},</p>
  <p>{intro}</p>
  <div style="background-color: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <h3 style="margin-top: 0; color: #1f2937;">{title}</h3>
    {description}
    <p style="color: #6b7280;">{details}</p>
  </div>
  {cheer}
  <p style="color: #6b7280; font-size: 14px;">{FOOTER}</p>
</div>"#,
        name = escape(user_name),
        title = escape(title),
    )
}

/// `dd/mm/yyyy`, as a French locale prints it.
fn french_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

//! Interactive setup (`-setup`): builds a [`ConfigDocument`] from terminal
//! prompts and writes it to disk.

mod prompt;
mod terminal;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::info;

pub use self::prompt::{
    is_affirmative,
    FieldPrompt,
    PromptEngine,
    Prompter,
    SectionPrompt,
    Step,
    AFFIRMATIVE_ANSWERS,
};
pub use self::terminal::TerminalPrompter;
use crate::configuration::{
    clean_path,
    default_tmp_path,
    ConfigDocument,
    LdapMappings,
    MySqlConfiguration,
    DEFAULT_CONFIGURATION_ASSET,
    UNIX_TMP_PATH,
};


/// Every prompt of the setup wizard, in order.
pub fn setup_steps() -> Vec<Step> {
    vec![
        FieldPrompt::new("DB Hostname", |document, value| document.mysql.hostname = value)
            .with_default(MySqlConfiguration::DEFAULT_HOSTNAME)
            .into(),
        FieldPrompt::new("DB User", |document, value| document.mysql.username = value)
            .with_default(MySqlConfiguration::DEFAULT_USERNAME)
            .into(),
        FieldPrompt::new("DB Password", |document, value| document.mysql.password = value).into(),
        FieldPrompt::new("DB Name", |document, value| document.mysql.database_name = value)
            .with_default(MySqlConfiguration::DEFAULT_DATABASE_NAME)
            .into(),
        scratch_path_prompt().into(),
        FieldPrompt::new(
            "Web root URL (optional, example http://localhost:8010/)",
            |document, value| document.web_host = value,
        )
        .into(),
        SectionPrompt::new("Enable email alerts", |document, enabled| document.email_alert = enabled)
            .with_steps(email_steps())
            .into(),
        SectionPrompt::new("Enable telegram alerts", |document, enabled| {
            document.telegram_alert = enabled
        })
        .with_steps(telegram_steps())
        .into(),
        SectionPrompt::new("Enable LDAP authentication", |document, enabled| {
            document.ldap_enable = enabled
        })
        .with_steps(ldap_steps())
        .into(),
    ]
}

fn scratch_path_prompt() -> FieldPrompt {
    let prompt = FieldPrompt::new("Playbook path", |document, value| document.tmp_path = value)
        .normalized_with(clean_scratch_path)
        .with_hidden_default();

    // Elsewhere the default depends on the temp dir and is filled in after the prompts.
    if cfg!(unix) {
        prompt.with_default(UNIX_TMP_PATH)
    } else {
        prompt
    }
}

fn clean_scratch_path(raw: &str) -> String {
    if raw.is_empty() {
        String::new()
    } else {
        clean_path(raw)
    }
}

fn email_steps() -> Vec<Step> {
    vec![
        FieldPrompt::new("Mail server host", |document, value| document.email_host = value)
            .with_default("localhost")
            .into(),
        FieldPrompt::new("Mail server port", |document, value| document.email_port = value)
            .with_default("25")
            .into(),
        FieldPrompt::new("Mail sender address", |document, value| document.email_sender = value)
            .with_default("semaphore@localhost")
            .into(),
    ]
}

fn telegram_steps() -> Vec<Step> {
    vec![
        FieldPrompt::new(
            "Telegram bot token (you can get it from @BotFather)",
            |document, value| document.telegram_token = value,
        )
        .with_default("")
        .into(),
        FieldPrompt::new("Telegram chat ID", |document, value| document.telegram_chat = value)
            .with_default("")
            .into(),
    ]
}

fn ldap_steps() -> Vec<Step> {
    vec![
        FieldPrompt::new("LDAP server host", |document, value| document.ldap_server = value)
            .with_default("localhost:389")
            .into(),
        SectionPrompt::new("Enable LDAP TLS connection", |document, enabled| {
            document.ldap_need_tls = enabled
        })
        .into(),
        FieldPrompt::new("LDAP DN for bind", |document, value| document.ldap_bind_dn = value)
            .with_default("cn=user,ou=users,dc=example")
            .into(),
        FieldPrompt::new("Password for LDAP bind user", |document, value| {
            document.ldap_bind_password = value
        })
        .with_default("pa55w0rd")
        .into(),
        FieldPrompt::new("LDAP DN for user search", |document, value| {
            document.ldap_search_dn = value
        })
        .with_default("ou=users,dc=example")
        .into(),
        FieldPrompt::new("LDAP search filter", |document, value| {
            document.ldap_search_filter = value
        })
        .with_default("(uid=%s)")
        .into(),
        FieldPrompt::new("LDAP mapping for DN field", |document, value| {
            document.ldap_mappings.dn = value
        })
        .with_default(LdapMappings::DEFAULT_DN)
        .into(),
        FieldPrompt::new("LDAP mapping for username field", |document, value| {
            document.ldap_mappings.uid = value
        })
        .with_default(LdapMappings::DEFAULT_UID)
        .into(),
        FieldPrompt::new("LDAP mapping for full name field", |document, value| {
            document.ldap_mappings.cn = value
        })
        .with_default(LdapMappings::DEFAULT_CN)
        .into(),
        FieldPrompt::new("LDAP mapping for email field", |document, value| {
            document.ldap_mappings.mail = value
        })
        .with_default(LdapMappings::DEFAULT_MAIL)
        .into(),
    ]
}


/// Drives [`setup_steps`] through a [`PromptEngine`].
pub struct SetupWizard<P> {
    prompter: P,
    steps: Vec<Step>,
}

impl<R: BufRead, W: Write> SetupWizard<Prompter<R, W>> {
    /// A wizard reading answers line by line from `reader`.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_prompter(Prompter::new(reader, writer))
    }

    pub fn into_inner(self) -> (R, W) {
        self.prompter.into_inner()
    }
}

impl SetupWizard<TerminalPrompter> {
    pub fn on_terminal() -> Self {
        Self::with_prompter(TerminalPrompter::stdout())
    }
}

impl<P: PromptEngine> SetupWizard<P> {
    pub fn with_prompter(prompter: P) -> Self {
        Self {
            prompter,
            steps: setup_steps(),
        }
    }

    /// Asks every prompt once and returns the resulting document.
    pub fn run(&mut self) -> io::Result<ConfigDocument> {
        let mut document = ConfigDocument::default();
        self.prompter.run_steps(&self.steps, &mut document)?;

        if document.tmp_path.is_empty() {
            document.tmp_path = default_tmp_path();
        }

        Ok(document)
    }

    /// Asks where `config.json` should be written.
    pub fn ask_output_directory(&mut self, default: &Path) -> io::Result<PathBuf> {
        let answer = self.prompter.ask(&format!(
            "Config output directory (default {})",
            default.display()
        ))?;

        if answer.is_empty() {
            Ok(default.to_path_buf())
        } else {
            Ok(PathBuf::from(answer))
        }
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        self.prompter.say(text)
    }
}


/// The complete `-setup` flow: run the wizard, generate cookie secrets, show
/// the document, and write it as `config.json` into the chosen directory.
///
/// Returns the path of the written file.
pub fn run_interactive_setup<P: PromptEngine>(
    wizard: &mut SetupWizard<P>,
    default_output_directory: &Path,
) -> Result<PathBuf> {
    wizard
        .say("Hello! You will now be guided through a setup to generate a configuration file.\n")
        .into_diagnostic()?;

    let mut document = wizard
        .run()
        .into_diagnostic()
        .wrap_err("Failed to read setup answers.")?;
    document.generate_cookie_secrets();

    let rendered = document
        .to_pretty_json()
        .into_diagnostic()
        .wrap_err("Failed to render configuration.")?;
    wizard
        .say(&format!("\nGenerated configuration:\n{rendered}\n"))
        .into_diagnostic()?;

    let output_directory = wizard
        .ask_output_directory(default_output_directory)
        .into_diagnostic()
        .wrap_err("Failed to read output directory.")?;
    let configuration_file_path = write_configuration(&rendered, &output_directory)?;

    wizard
        .say(&format!(
            "\nConfiguration written to {}.\nStart the server with: semaphore -config {}",
            configuration_file_path.display(),
            configuration_file_path.display()
        ))
        .into_diagnostic()?;

    Ok(configuration_file_path)
}

fn write_configuration(rendered: &str, output_directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_directory)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Failed to create configuration directory at {}.",
                output_directory.display()
            )
        })?;

    let configuration_file_path = output_directory.join(DEFAULT_CONFIGURATION_ASSET);
    fs::write(&configuration_file_path, rendered)
        .into_diagnostic()
        .wrap_err_with(|| {
            miette!(
                "Failed to write configuration file to {}.",
                configuration_file_path.display()
            )
        })?;

    info!(path = %configuration_file_path.display(), "Configuration file written.");

    Ok(configuration_file_path)
}



#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn wizard(input: &str) -> SetupWizard<Prompter<Cursor<Vec<u8>>, Vec<u8>>> {
        SetupWizard::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    /// Nine top-level prompts: four DB fields, path, web root, three sections.
    const TOP_LEVEL_PROMPTS: usize = 9;

    #[test]
    fn all_empty_answers_yield_documented_defaults() {
        let document = wizard(&"\n".repeat(TOP_LEVEL_PROMPTS)).run().unwrap();

        let expected = ConfigDocument {
            mysql: MySqlConfiguration::local_defaults(),
            tmp_path: default_tmp_path(),
            ..ConfigDocument::default()
        };
        assert_eq!(document, expected);
    }

    #[test]
    fn enabled_sections_with_empty_answers_yield_section_defaults() {
        // DB x4, path, web root, email (y + 3), telegram (y + 2), ldap (y + server, tls, 8 more).
        let mut input = String::new();
        input.push_str(&"\n".repeat(6));
        input.push_str("y\n\n\n\n");
        input.push_str("yes\n\n\n");
        input.push_str("y\n\n\n");
        input.push_str(&"\n".repeat(8));

        let document = wizard(&input).run().unwrap();

        assert!(document.email_alert);
        assert_eq!(document.email_host, "localhost");
        assert_eq!(document.email_port, "25");
        assert_eq!(document.email_sender, "semaphore@localhost");

        assert!(document.telegram_alert);
        assert!(document.telegram_token.is_empty());
        assert!(document.telegram_chat.is_empty());

        assert!(document.ldap_enable);
        assert!(!document.ldap_need_tls);
        assert_eq!(document.ldap_server, "localhost:389");
        assert_eq!(document.ldap_bind_dn, "cn=user,ou=users,dc=example");
        assert_eq!(document.ldap_bind_password, "pa55w0rd");
        assert_eq!(document.ldap_search_dn, "ou=users,dc=example");
        assert_eq!(document.ldap_search_filter, "(uid=%s)");
        assert_eq!(document.ldap_mappings, LdapMappings::wizard_defaults());
    }

    #[test]
    fn answers_override_defaults() {
        let input = [
            "db.internal:3306",
            "semaphore",
            "hunter2",
            "automation",
            "/var//lib/semaphore/./work/../",
            "https://ci.example.com/",
            "n",
            "no",
            "y",
            "ldap.example.com:636",
            "y",
            "",
            "",
            "",
            "(sAMAccountName=%s)",
            "",
            "sAMAccountName",
            "",
            "",
        ]
        .join("\n");

        let document = wizard(&input).run().unwrap();

        assert_eq!(document.mysql.hostname, "db.internal:3306");
        assert_eq!(document.mysql.username, "semaphore");
        assert_eq!(document.mysql.password, "hunter2");
        assert_eq!(document.mysql.database_name, "automation");
        assert_eq!(document.tmp_path, "/var/lib/semaphore");
        assert_eq!(document.web_host, "https://ci.example.com/");
        assert!(!document.email_alert);
        assert!(!document.telegram_alert);
        assert!(document.ldap_enable);
        assert!(document.ldap_need_tls);
        assert_eq!(document.ldap_server, "ldap.example.com:636");
        assert_eq!(document.ldap_search_filter, "(sAMAccountName=%s)");
        assert_eq!(document.ldap_mappings.uid, "sAMAccountName");
        assert_eq!(document.ldap_mappings.cn, "cn");
    }

    #[test]
    fn interactive_setup_writes_configuration_file() {
        let directory = tempfile::tempdir().unwrap();
        let output_directory = directory.path().join("nested");
        let input = format!(
            "{}{}\n",
            "\n".repeat(TOP_LEVEL_PROMPTS),
            output_directory.display()
        );
        let mut wizard = wizard(&input);

        let written = run_interactive_setup(&mut wizard, directory.path()).unwrap();

        assert_eq!(written, output_directory.join("config.json"));
        let document = ConfigDocument::load_from_path(&written).unwrap();
        assert_eq!(document.mysql.database_name, "semaphore");
        assert!(!document.cookie_hash.is_empty());
        assert!(!document.cookie_encryption.is_empty());

        let (_, output) = wizard.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains(" > DB Hostname (default 127.0.0.1:3306): "));
        assert!(output.contains(" > Playbook path: "));
        assert!(output.contains("-config"));
    }

    #[test]
    fn output_directory_defaults_when_empty() {
        let directory = tempfile::tempdir().unwrap();
        let mut wizard = wizard(&"\n".repeat(TOP_LEVEL_PROMPTS + 1));

        let written = run_interactive_setup(&mut wizard, directory.path()).unwrap();

        assert_eq!(written, directory.path().join("config.json"));
        assert!(written.exists());
    }
}

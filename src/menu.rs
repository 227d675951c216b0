//! Interactive console menu.
//!
//! Owns the [`Session`] and translates every engine error into a message; the
//! loop ends only on the exit choice or end of input.

use locker_core::{
    report, CredentialHasher, LockerEngine, LockerError, Sha256Hasher, Session,
};
use std::io::{self, BufRead, Write};
use std::path::Path;

const INVALID_NUMBER: &str = "Invalid input. Please enter a number.";
const INVALID_CHOICE: &str = "Invalid choice. Please try again.";

pub struct Console<'a, R, W, H = Sha256Hasher> {
    engine: &'a LockerEngine<H>,
    input: R,
    output: W,
    session: Session,
}

impl<'a, R: BufRead, W: Write, H: CredentialHasher> Console<'a, R, W, H> {
    pub fn new(engine: &'a LockerEngine<H>, input: R, output: W) -> Self {
        Self {
            engine,
            input,
            output,
            session: Session::anonymous(),
        }
    }

    /// Runs until the user exits or input is exhausted.
    ///
    /// Only failures to read input or write output are returned.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let keep_going = if self.session.is_authenticated() {
                self.user_menu()?
            } else {
                self.anonymous_menu()?
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    fn anonymous_menu(&mut self) -> io::Result<bool> {
        writeln!(self.output, "\n--- Locker ---")?;
        writeln!(self.output, "1. Login")?;
        writeln!(self.output, "2. Register")?;
        writeln!(self.output, "3. Exit")?;

        let Some(choice) = self.read_choice()? else {
            return Ok(false);
        };
        match choice {
            1 => self.login(),
            2 => self.register(),
            3 => {
                writeln!(self.output, "Exiting locker. Goodbye!")?;
                Ok(false)
            }
            _ => {
                writeln!(self.output, "{INVALID_CHOICE}")?;
                Ok(true)
            }
        }
    }

    fn user_menu(&mut self) -> io::Result<bool> {
        let name = self
            .session
            .current()
            .map(|user| user.username().to_string())
            .unwrap_or_default();
        writeln!(self.output, "\n--- Welcome, {name} ---")?;
        writeln!(self.output, "1. Upload File")?;
        writeln!(self.output, "2. Download File")?;
        writeln!(self.output, "3. List Files")?;
        writeln!(self.output, "4. Logout")?;

        let Some(choice) = self.read_choice()? else {
            return Ok(false);
        };
        match choice {
            1 => self.upload(),
            2 => self.download(),
            3 => self.list().map(|()| true),
            4 => {
                self.engine.logout(&mut self.session);
                writeln!(self.output, "Logged out successfully.")?;
                Ok(true)
            }
            _ => {
                writeln!(self.output, "{INVALID_CHOICE}")?;
                Ok(true)
            }
        }
    }

    fn login(&mut self) -> io::Result<bool> {
        let Some(username) = self.prompt("Enter username: ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt_secret("Enter password: ")? else {
            return Ok(false);
        };

        match self.engine.authenticate(&username, &password) {
            Ok(user) => {
                writeln!(self.output, "Login successful! Welcome, {}.", user.username())?;
                self.session.sign_in(user);
            }
            Err(e) => self.report("logging in", &e)?,
        }
        Ok(true)
    }

    fn register(&mut self) -> io::Result<bool> {
        let Some(username) = self.prompt("Enter desired username: ")? else {
            return Ok(false);
        };
        let Some(password) = self.prompt_secret("Enter desired password: ")? else {
            return Ok(false);
        };

        match self.engine.register(&username, &password) {
            Ok(_) => writeln!(
                self.output,
                "Registration successful! You can now log in."
            )?,
            Err(LockerError::DuplicateIdentity(_)) => writeln!(
                self.output,
                "Username already exists. Please choose a different username."
            )?,
            Err(e) => self.report("registering", &e)?,
        }
        Ok(true)
    }

    fn upload(&mut self) -> io::Result<bool> {
        let Some(source) = self.prompt("Enter the full path of the file to upload: ")? else {
            return Ok(false);
        };

        match self.engine.upload(&self.session, Path::new(&source)) {
            Ok(record) => writeln!(
                self.output,
                "File uploaded successfully! ID: {}",
                record.id
            )?,
            Err(e) => self.report("uploading file", &e)?,
        }
        Ok(true)
    }

    fn download(&mut self) -> io::Result<bool> {
        self.list()?;

        let Some(file_id) = self.prompt("Enter the File ID to download: ")? else {
            return Ok(false);
        };
        let Some(destination) = self.prompt("Enter the destination directory for download: ")?
        else {
            return Ok(false);
        };

        match self
            .engine
            .download(&self.session, &file_id, Path::new(&destination))
        {
            Ok(_) => writeln!(self.output, "File downloaded successfully!")?,
            Err(e) => self.report("downloading file", &e)?,
        }
        Ok(true)
    }

    fn list(&mut self) -> io::Result<()> {
        match self.engine.list(&self.session) {
            Ok(records) => write!(self.output, "{}", report::file_table(&records)),
            Err(e) => self.report("listing files", &e),
        }
    }

    fn report(&mut self, action: &str, err: &LockerError) -> io::Result<()> {
        tracing::debug!(error = ?err, "{action} failed");
        match err {
            LockerError::AuthFailure
            | LockerError::NotAuthenticated
            | LockerError::NotFound(_)
            | LockerError::Validation(_) => writeln!(self.output, "{err}"),
            _ => writeln!(self.output, "Error {action}: {err}"),
        }
    }

    /// Reads a menu number, re-prompting on anything that is not one.
    fn read_choice(&mut self) -> io::Result<Option<u32>> {
        loop {
            let Some(line) = self.prompt("Enter your choice: ")? else {
                return Ok(None);
            };
            match line.parse() {
                Ok(choice) => return Ok(Some(choice)),
                Err(_) => writeln!(self.output, "{INVALID_NUMBER}")?,
            }
        }
    }

    /// Prints `label` and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        Ok(self.prompt_secret(label)?.map(|line| line.trim().to_string()))
    }

    /// Like [`Console::prompt`] but strips only the line ending, so passwords
    /// keep surrounding spaces.
    fn prompt_secret(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let content = line.strip_suffix('\n').unwrap_or(&line);
        let content = content.strip_suffix('\r').unwrap_or(content);
        Ok(Some(content.to_string()))
    }
}

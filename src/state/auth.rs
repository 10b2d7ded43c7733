use crate::api::client::ApiClient;
use crate::api::models::{LoginRequest, RegisterClientRequest, RegisterCompanyRequest, Role, User};
use crate::error::{ClientResult, ValidationError};
use crate::session::SessionStore;
use crate::state::Route;
use crate::state::notice::Notice;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(LoginRequest {
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientRegistration {
    pub name: String,
    pub surname: String,
    pub sex: String,
    pub email: String,
    pub tax_id: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: String,
    pub about: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyRegistration {
    pub legal_name: String,
    pub cnpj: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Sign-up form; the required fields depend on the account kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationForm {
    Client(ClientRegistration),
    Company(CompanyRegistration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationRequest {
    Client(RegisterClientRequest),
    Company(RegisterCompanyRequest),
}

fn missing(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

impl RegistrationForm {
    pub fn role(&self) -> Role {
        match self {
            RegistrationForm::Client(_) => Role::Cliente,
            RegistrationForm::Company(_) => Role::Empresa,
        }
    }

    /// Required fields first, then the password confirmation.
    pub fn validate(&self) -> Result<RegistrationRequest, ValidationError> {
        match self {
            RegistrationForm::Client(f) => {
                let missing = missing(&[
                    ("nome", &f.name),
                    ("sobrenome", &f.surname),
                    ("email", &f.email),
                    ("senha", &f.password),
                    ("confirmacao_senha", &f.password_confirmation),
                    ("cpf_cnpj", &f.tax_id),
                    ("telefone", &f.phone),
                ]);
                if !missing.is_empty() {
                    return Err(ValidationError::MissingFields(missing));
                }
                if f.password != f.password_confirmation {
                    return Err(ValidationError::PasswordMismatch);
                }
                Ok(RegistrationRequest::Client(RegisterClientRequest {
                    name: f.name.trim().to_string(),
                    surname: f.surname.trim().to_string(),
                    sex: f.sex.trim().to_string(),
                    email: f.email.trim().to_string(),
                    tax_id: f.tax_id.trim().to_string(),
                    password: f.password.clone(),
                    password_confirmation: f.password_confirmation.clone(),
                    phone: f.phone.trim().to_string(),
                    about: f.about.trim().to_string(),
                }))
            }
            RegistrationForm::Company(f) => {
                let missing = missing(&[
                    ("razao_social", &f.legal_name),
                    ("cnpj", &f.cnpj),
                    ("email", &f.email),
                    ("senha", &f.password),
                    ("confirmacao_senha", &f.password_confirmation),
                    ("telefone", &f.phone),
                ]);
                if !missing.is_empty() {
                    return Err(ValidationError::MissingFields(missing));
                }
                if f.password != f.password_confirmation {
                    return Err(ValidationError::PasswordMismatch);
                }
                Ok(RegistrationRequest::Company(RegisterCompanyRequest {
                    legal_name: f.legal_name.trim().to_string(),
                    cnpj: f.cnpj.trim().to_string(),
                    phone: f.phone.trim().to_string(),
                    email: f.email.trim().to_string(),
                    password: f.password.clone(),
                    password_confirmation: f.password_confirmation.clone(),
                }))
            }
        }
    }
}

/// Validates, calls `/auth/login` and stores the session.
pub async fn login(client: &ApiClient, form: &LoginForm) -> ClientResult<User> {
    let request = form.validate()?;
    let response = client.login(&request).await?;
    let (session_id, user) = response.into_parts();
    log::info!("logged in as {} ({})", user.email, user.role);
    client.session().login(user.clone(), session_id);
    Ok(user)
}

/// Validates and registers. Does not log in.
pub async fn register(client: &ApiClient, form: &RegistrationForm) -> ClientResult<()> {
    match form.validate()? {
        RegistrationRequest::Client(req) => client.register_client(&req).await?,
        RegistrationRequest::Company(req) => client.register_company(&req).await?,
    }
    log::info!("registered new {} account", form.role());
    Ok(())
}

pub fn logout(session: &SessionStore) -> Route {
    session.logout();
    log::info!("logged out");
    Route::Login
}

/// Where to go and what to tell the user after a login attempt.
pub fn login_outcome(result: &ClientResult<User>) -> (Option<Route>, Notice) {
    match result {
        Ok(_) => (
            Some(Route::Home),
            Notice::success("Login realizado!", "Bem-vindo de volta."),
        ),
        Err(e) => (None, Notice::from_client_error("Erro no login", e)),
    }
}

pub fn register_outcome(result: &ClientResult<()>) -> (Option<Route>, Notice) {
    match result {
        Ok(()) => (
            Some(Route::Login),
            Notice::success(
                "Cadastro realizado!",
                "Bem-vindo(a)! Agora você pode fazer login.",
            ),
        ),
        Err(e) => (None, Notice::from_client_error("Erro no cadastro", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::notice::NoticeLevel;

    fn client_form() -> ClientRegistration {
        ClientRegistration {
            name: "Ana".into(),
            surname: "Souza".into(),
            sex: String::new(),
            email: "ana@x.com".into(),
            tax_id: "123.456.789-00".into(),
            password: "segredo".into(),
            password_confirmation: "segredo".into(),
            phone: "11999990000".into(),
            about: String::new(),
        }
    }

    #[test]
    fn login_needs_email_and_password() {
        let form = LoginForm {
            email: " ".into(),
            password: "x".into(),
            role: Role::Cliente,
        };
        assert_eq!(form.validate(), Err(ValidationError::MissingCredentials));

        let form = LoginForm {
            email: " cliente@x.com ".into(),
            password: "x".into(),
            role: Role::Empresa,
        };
        let req = form.validate().unwrap();
        assert_eq!(req.email, "cliente@x.com");
        assert_eq!(req.role, Role::Empresa);
    }

    #[test]
    fn client_registration_lists_missing_fields() {
        let form = RegistrationForm::Client(ClientRegistration {
            surname: String::new(),
            phone: " ".into(),
            ..client_form()
        });
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingFields(vec!["sobrenome", "telefone"]))
        );
    }

    #[test]
    fn sex_and_about_are_optional_for_clients() {
        let form = RegistrationForm::Client(client_form());
        assert!(matches!(form.validate(), Ok(RegistrationRequest::Client(_))));
    }

    #[test]
    fn company_fields_differ_from_client_fields() {
        let form = RegistrationForm::Company(CompanyRegistration {
            legal_name: "Tech Solutions LTDA".into(),
            cnpj: String::new(),
            phone: "1133334444".into(),
            email: "contato@techsolutions.com".into(),
            password: "a".into(),
            password_confirmation: "a".into(),
        });
        assert_eq!(form.role(), Role::Empresa);
        assert_eq!(form.validate(), Err(ValidationError::MissingFields(vec!["cnpj"])));
    }

    #[test]
    fn password_confirmation_must_match() {
        let form = RegistrationForm::Client(ClientRegistration {
            password_confirmation: "outra".into(),
            ..client_form()
        });
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn outcomes_route_and_notify() {
        let (route, notice) = register_outcome(&Ok(()));
        assert_eq!(route, Some(Route::Login));
        assert_eq!(notice.level, NoticeLevel::Success);

        let (route, notice) =
            register_outcome(&Err(ValidationError::PasswordMismatch.into()));
        assert_eq!(route, None);
        assert_eq!(notice.title, "Senhas não conferem");

        let (route, notice) = login_outcome(&Err(ValidationError::MissingCredentials.into()));
        assert_eq!(route, None);
        assert_eq!(notice.level, NoticeLevel::Warning);
    }

    #[test]
    fn logout_clears_session_and_goes_to_login() {
        let session = SessionStore::in_memory();
        session.login(
            User {
                id: "u1".into(),
                name: "Ana".into(),
                email: "ana@x.com".into(),
                role: Role::Cliente,
            },
            "s1",
        );
        assert_eq!(logout(&session), Route::Login);
        assert!(!session.is_authenticated());
    }
}

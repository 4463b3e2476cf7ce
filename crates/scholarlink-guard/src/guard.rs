//! The route guard state machine.

use scholarlink_models::{
    AuthSession, Fault, FaultKind, LoginRequest, Role, VerifiedIdentity, VerifiedSession,
    VerifyTokenRequest,
};
use scholarlink_sdk::IdentityApi;
use tracing::{debug, info, warn};

use crate::error::GuardError;
use crate::routes::{home_route, RouteTable, LOGIN_ROUTE};
use crate::token_store::{FileTokenStore, StoredSession, TokenStore};

/// Where the guard stands with the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// No verification attempted yet.
    Unknown,
    /// A verification request is in flight.
    Verifying,
    /// The token was verified; the role is cached for the session.
    Authorized(Role),
    /// No valid session.
    Unauthorized,
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested route.
    Render,
    /// Go somewhere else instead.
    Redirect(String),
}

impl Navigation {
    fn to(path: &str) -> Self {
        Self::Redirect(path.to_string())
    }
}

/// Identifies one verification attempt. Only the latest one may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationTicket(u64);

/// Holds the verified identity and gates navigation.
pub struct RouteGuard<A, T> {
    api: A,
    tokens: T,
    table: RouteTable,
    state: GuardState,
    identity: Option<VerifiedIdentity>,
    latest_ticket: u64,
}

impl<A: IdentityApi, T: TokenStore> RouteGuard<A, T> {
    /// A guard in [`GuardState::Unknown`].
    pub fn new(api: A, tokens: T, table: RouteTable) -> Self {
        Self {
            api,
            tokens,
            table,
            state: GuardState::Unknown,
            identity: None,
            latest_ticket: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// The verified identity, once authorized.
    pub fn identity(&self) -> Option<&VerifiedIdentity> {
        self.identity.as_ref()
    }

    /// The permission table in use.
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The stored token, for attaching to data-layer requests.
    pub fn token(&self) -> Option<String> {
        self.load_session().map(|s| s.token)
    }

    // -- verification -------------------------------------------------------

    /// Start a verification of the stored token.
    ///
    /// Returns the ticket and token to verify, or `None` when there is no
    /// stored token (the guard is then `Unauthorized`). Any verification
    /// still in flight is superseded.
    pub fn begin_verification(&mut self) -> Option<(VerificationTicket, String)> {
        let ticket = self.next_ticket();
        let Some(session) = self.load_session() else {
            debug!("no stored token");
            self.sign_out();
            return None;
        };
        self.state = GuardState::Verifying;
        Some((ticket, session.token))
    }

    /// Apply the result of a verification.
    ///
    /// Results for superseded tickets are ignored and return `None`. A
    /// failure returns the redirect to the login route.
    pub fn complete_verification(
        &mut self,
        ticket: VerificationTicket,
        outcome: Result<VerifiedSession, Fault>,
    ) -> Option<Navigation> {
        if ticket.0 != self.latest_ticket || self.state != GuardState::Verifying {
            debug!(ticket = ticket.0, latest = self.latest_ticket, "ignoring stale verification");
            return None;
        }

        match outcome {
            Ok(session) => {
                self.authorize(session.principal, session.token);
                None
            }
            Err(fault) => {
                // Every failure looks the same to the user; keep the kind in the logs.
                warn!(kind = %fault.kind, status = fault.status_code, "session verification failed");
                self.sign_out();
                Some(Navigation::to(LOGIN_ROUTE))
            }
        }
    }

    /// Verify the stored token against the identity service.
    pub async fn verify(&mut self) -> GuardState {
        let Some((ticket, token)) = self.begin_verification() else {
            return self.state;
        };
        let outcome = self.api.verify_token(VerifyTokenRequest { token }).await;
        self.complete_verification(ticket, outcome);
        self.state
    }

    // -- session changes ----------------------------------------------------

    /// Log in through the identity service and land on the role's home.
    pub async fn login(&mut self, req: LoginRequest) -> Result<Navigation, Fault> {
        let session = self.api.login(req).await?;
        Ok(self.sign_in(session))
    }

    /// Adopt a session returned by `register` or `login`.
    pub fn sign_in(&mut self, session: AuthSession) -> Navigation {
        self.next_ticket();
        let identity = VerifiedIdentity::from(&session.principal);
        let role = identity.role;
        self.authorize(identity, session.token);
        self.landing(role)
    }

    /// Explicit logout.
    pub fn logout(&mut self) -> Navigation {
        info!("logout");
        self.next_ticket();
        self.sign_out();
        Navigation::to(LOGIN_ROUTE)
    }

    /// Handle a fault reported by the data layer.
    ///
    /// Only `invalidToken` ends the session; other faults are left to the
    /// caller and return `None`.
    pub fn report_fault(&mut self, fault: &Fault) -> Option<Navigation> {
        if fault.kind != FaultKind::InvalidToken {
            return None;
        }
        warn!(message = %fault.message, "session rejected mid-session");
        self.next_ticket();
        self.sign_out();
        Some(Navigation::to(LOGIN_ROUTE))
    }

    // -- navigation ---------------------------------------------------------

    /// Decide a navigation from the current state without verifying.
    ///
    /// Anything short of `Authorized` is treated as signed out.
    pub fn decide(&self, path: &str) -> Navigation {
        match self.state {
            GuardState::Authorized(role) => {
                if self.table.is_allowed(role, path) {
                    Navigation::Render
                } else {
                    debug!(%role, path, "route refused");
                    self.landing(role)
                }
            }
            GuardState::Unknown | GuardState::Verifying | GuardState::Unauthorized => {
                if self.table.is_public(path) {
                    Navigation::Render
                } else {
                    Navigation::to(LOGIN_ROUTE)
                }
            }
        }
    }

    /// Navigate to `path`, verifying the stored token first on the first call.
    pub async fn navigate(&mut self, path: &str) -> Navigation {
        if self.state == GuardState::Unknown {
            self.verify().await;
        }
        self.decide(path)
    }

    // -- internals ----------------------------------------------------------

    /// The role's home, or the login route when the table refuses the home too.
    fn landing(&self, role: Role) -> Navigation {
        let home = home_route(role);
        if self.table.is_allowed(role, home) {
            Navigation::to(home)
        } else {
            warn!(%role, home, "route table refuses the role's home route");
            Navigation::to(LOGIN_ROUTE)
        }
    }

    fn next_ticket(&mut self) -> VerificationTicket {
        self.latest_ticket += 1;
        VerificationTicket(self.latest_ticket)
    }

    fn load_session(&self) -> Option<StoredSession> {
        self.tokens.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not read stored session");
            None
        })
    }

    fn authorize(&mut self, identity: VerifiedIdentity, token: String) {
        let session = StoredSession {
            token,
            identity: identity.clone(),
        };
        if let Err(e) = self.tokens.save(&session) {
            warn!(error = %e, "could not persist session");
        }
        info!(principal = %identity.id, role = %identity.role, "session authorized");
        self.state = GuardState::Authorized(identity.role);
        self.identity = Some(identity);
    }

    fn sign_out(&mut self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "could not clear stored session");
        }
        self.identity = None;
        self.state = GuardState::Unauthorized;
    }
}

impl<A: IdentityApi> RouteGuard<A, FileTokenStore> {
    /// A guard keeping its session in the user's configuration directory.
    pub fn with_config_dir(api: A, table: RouteTable) -> Result<Self, GuardError> {
        Ok(Self::new(api, FileTokenStore::in_config_dir()?, table))
    }
}

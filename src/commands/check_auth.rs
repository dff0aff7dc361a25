/// `check-auth` command: verify the configured credentials yield an access token.
use crate::cli::OutputCtx;
use crate::cli::output::write_auth;
use crate::sheets::GoogleSheets;
use crate::types::AuthOutput;
use crate::writer::WriterError;

/// Run `sheetwriter check-auth`.
///
/// # Errors
///
/// Returns `WriterError::Sheets` if no token can be obtained.
pub fn run(ctx: &OutputCtx, client: &mut GoogleSheets) -> Result<(), WriterError> {
    let _t = ctx.timer("authenticate");
    client.authenticate()?;

    write_auth(
        &AuthOutput {
            ok: true,
            credential_kind: client.credentials().kind().to_owned(),
        },
        ctx,
    );
    Ok(())
}

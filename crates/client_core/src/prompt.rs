/// Blocking dialogs provided by the host surface.
pub trait Prompt {
    /// Asks a yes/no question; `true` means the user accepted.
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

impl<P: Prompt + ?Sized> Prompt for &mut P {
    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn alert(&mut self, message: &str) {
        (**self).alert(message)
    }
}
